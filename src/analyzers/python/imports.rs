use crate::core::{Import, ImportedName};
use tree_sitter::Node;

/// Collect every `import` / `from ... import` statement in the file, at any
/// nesting depth. `from __future__` imports are compiler directives and are
/// not recorded.
pub fn extract_imports(node: Node, source: &str, file_id: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    visit_node_for_imports(node, source, file_id, &mut imports);
    imports
}

fn visit_node_for_imports(node: Node, source: &str, file_id: &str, imports: &mut Vec<Import>) {
    match node.kind() {
        "import_statement" => {
            let line = node.start_position().row + 1;
            let mut cursor = node.walk();
            for name_node in node.children_by_field_name("name", &mut cursor) {
                if let Some((module, alias)) = aliased(name_node, source) {
                    imports.push(Import::module(file_id, &module, alias, line));
                }
            }
            return;
        }
        "import_from_statement" => {
            if let Some(import) = from_import(node, source, file_id) {
                imports.push(import);
            }
            return;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_node_for_imports(child, source, file_id, imports);
    }
}

fn from_import(node: Node, source: &str, file_id: &str) -> Option<Import> {
    let module_node = node.child_by_field_name("module_name")?;
    let (level, module) = match module_node.kind() {
        "relative_import" => relative_module(module_node, source),
        _ => (0, text(module_node, source)?.to_string()),
    };
    if level == 0 && module == "__future__" {
        return None;
    }

    let mut cursor = node.walk();
    let wildcard = node
        .children(&mut cursor)
        .any(|child| child.kind() == "wildcard_import");

    let mut cursor = node.walk();
    let names = node
        .children_by_field_name("name", &mut cursor)
        .filter_map(|name_node| aliased(name_node, source))
        .map(|(name, alias)| ImportedName { name, alias })
        .collect();

    Some(Import::from(
        file_id,
        &module,
        level,
        names,
        wildcard,
        node.start_position().row + 1,
    ))
}

/// `..pkg.mod` -> (2, "pkg.mod"); `.` -> (1, "")
fn relative_module(node: Node, source: &str) -> (usize, String) {
    let mut level = 0;
    let mut module = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_prefix" => {
                level = text(child, source)
                    .map(|t| t.chars().filter(|c| *c == '.').count())
                    .unwrap_or(0);
            }
            "dotted_name" => {
                module = text(child, source).unwrap_or_default().to_string();
            }
            _ => {}
        }
    }
    (level, module)
}

/// A `dotted_name` or `aliased_import` as (name, alias)
fn aliased(node: Node, source: &str) -> Option<(String, Option<String>)> {
    match node.kind() {
        "aliased_import" => {
            let name = text(node.child_by_field_name("name")?, source)?;
            let alias = node
                .child_by_field_name("alias")
                .and_then(|a| text(a, source))
                .map(str::to_string);
            Some((name.to_string(), alias))
        }
        "dotted_name" | "identifier" => Some((text(node, source)?.to_string(), None)),
        _ => None,
    }
}

fn text<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}
