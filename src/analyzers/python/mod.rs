mod antipatterns;
mod complexity;
mod functions;
mod imports;

pub use complexity::{calculate_cyclomatic_complexity, count_decision_points};
pub use functions::collect_calls;

use crate::analyzers::Analyzer;
use crate::core::{AnalysisError, Language, ParseStatus, Result, SourceUnit};
use std::collections::BTreeSet;
use tree_sitter::{Node, Parser};

pub struct PythonAnalyzer {
    /// 0 disables the per-file budget
    timeout_micros: u64,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self { timeout_micros: 0 }
    }

    pub fn with_timeout_micros(timeout_micros: u64) -> Self {
        Self { timeout_micros }
    }

    fn create_parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| AnalysisError::Parser(format!("Failed to set Python language: {e}")))?;
        if self.timeout_micros > 0 {
            parser.set_timeout_micros(self.timeout_micros);
        }
        Ok(parser)
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for PythonAnalyzer {
    fn analyze(&self, content: &str, file_id: &str) -> Result<SourceUnit> {
        let mut parser = self.create_parser()?;

        let Some(tree) = parser.parse(content, None) else {
            log::warn!(
                "Parsing {file_id} exceeded {}ms, skipping",
                self.timeout_micros / 1_000
            );
            return Ok(SourceUnit::failed(
                file_id,
                Language::Python,
                ParseStatus::TimedOut,
            ));
        };

        let root = tree.root_node();
        if let Some(reason) = syntax_error(root) {
            log::debug!("{file_id}: {reason}");
            return Ok(SourceUnit::failed(
                file_id,
                Language::Python,
                ParseStatus::parse_error(reason),
            ));
        }

        let definitions = functions::extract_definitions(root, content, file_id);
        let mut unit = SourceUnit::new(file_id, Language::Python);
        unit.imports = imports::extract_imports(root, content, file_id);
        unit.functions = definitions.functions;
        unit.classes = definitions.classes;
        unit.module_calls = definitions.module_calls;
        unit.referenced_names = referenced_names(root, content);
        unit.exported_names = exported_names(root, content);
        unit.antipatterns = antipatterns::extract_antipatterns(root, content);
        Ok(unit)
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

/// Description of the first `ERROR` or `MISSING` node, if any
fn syntax_error(root: Node) -> Option<String> {
    let node = first_error(root)?;
    let line = node.start_position().row + 1;
    Some(if node.is_missing() {
        format!("syntax error at line {line}: missing '{}'", node.kind())
    } else {
        format!("syntax error at line {line}")
    })
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Identifiers appearing anywhere outside import statements
fn referenced_names(root: Node, source: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    visit_node_for_names(root, source, &mut names);
    names
}

fn visit_node_for_names(node: Node, source: &str, names: &mut BTreeSet<String>) {
    match node.kind() {
        "import_statement" | "import_from_statement" | "future_import_statement" => return,
        "identifier" => {
            if let Ok(name) = node.utf8_text(source.as_bytes()) {
                names.insert(name.to_string());
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_node_for_names(child, source, names);
    }
}

/// String entries of top-level `__all__ = [...]` and `__all__ += [...]`
fn exported_names(root: Node, source: &str) -> BTreeSet<String> {
    let mut exports = BTreeSet::new();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "expression_statement" {
            continue;
        }
        let Some(assignment) = statement.named_child(0) else {
            continue;
        };
        if !matches!(assignment.kind(), "assignment" | "augmented_assignment") {
            continue;
        }
        let targets_all = assignment
            .child_by_field_name("left")
            .and_then(|left| left.utf8_text(source.as_bytes()).ok())
            == Some("__all__");
        if !targets_all {
            continue;
        }
        if let Some(value) = assignment.child_by_field_name("right") {
            let mut inner = value.walk();
            for item in value.named_children(&mut inner) {
                if item.kind() != "string" {
                    continue;
                }
                if let Ok(literal) = item.utf8_text(source.as_bytes()) {
                    exports.insert(literal.trim_matches(|c| c == '"' || c == '\'').to_string());
                }
            }
        }
    }
    exports
}
