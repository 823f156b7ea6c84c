pub mod errors;
pub mod issue;

pub use errors::{AnalysisError, Result};
pub use issue::{
    Category, Evidence, FindingKind, ImpactLevel, ImpactScore, Issue, Location, Severity,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Component, Path};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" | "pyw" => Language::Python,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Python => write!(f, "Python"),
            Language::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Inclusive, 1-based line span
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }
}

/// Outcome of parsing one file. Anything but `Ok` keeps the file out of
/// both graphs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseStatus {
    Ok,
    ParseError { reason: String },
    TimedOut,
    Cancelled,
}

impl ParseStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ParseStatus::Ok)
    }

    pub fn parse_error(reason: impl Into<String>) -> Self {
        ParseStatus::ParseError {
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import a.b [as c]`
    Module,
    /// `from a.b import c [as d]`, `from . import c`, `from a import *`
    From,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// Name the import binds in the importing file
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Import {
    pub source_file: String,
    /// Dotted module identifier as written, without leading dots
    pub module: String,
    pub kind: ImportKind,
    /// Number of leading dots of a relative import
    pub level: usize,
    /// `import a.b as c` alias
    pub alias: Option<String>,
    pub names: Vec<ImportedName>,
    pub wildcard: bool,
    pub line: usize,
    /// File id of the target inside the analysed root; `None` for external
    /// or unresolvable modules
    pub resolved: Option<String>,
}

impl Import {
    pub fn module(source_file: &str, module: &str, alias: Option<String>, line: usize) -> Self {
        Self {
            source_file: source_file.to_string(),
            module: module.to_string(),
            kind: ImportKind::Module,
            level: 0,
            alias,
            names: Vec::new(),
            wildcard: false,
            line,
            resolved: None,
        }
    }

    pub fn from(
        source_file: &str,
        module: &str,
        level: usize,
        names: Vec<ImportedName>,
        wildcard: bool,
        line: usize,
    ) -> Self {
        Self {
            source_file: source_file.to_string(),
            module: module.to_string(),
            kind: ImportKind::From,
            level,
            alias: None,
            names,
            wildcard,
            line,
            resolved: None,
        }
    }

    /// Module identifier as it appears in source, e.g. `..pkg.mod`
    pub fn display_module(&self) -> String {
        format!("{}{}", ".".repeat(self.level), self.module)
    }

    /// Name bound by `import a.b.c` (`a`) or its alias
    pub fn module_binding(&self) -> Option<&str> {
        match self.kind {
            ImportKind::Module => Some(
                self.alias
                    .as_deref()
                    .unwrap_or_else(|| self.module.split('.').next().unwrap_or(&self.module)),
            ),
            ImportKind::From => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionDef {
    /// `<file id>::<local name>`
    pub qualified_name: String,
    /// `func` for top-level functions, `Class.method` for methods
    pub name: String,
    pub class_name: Option<String>,
    pub file: String,
    pub lines: LineRange,
    /// `self`/`cls` of a method; not an annotatable slot
    pub receiver: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_annotation: Option<String>,
    pub complexity: u32,
    /// Callee expressions as written (`f`, `self.m`, `mod.f`)
    pub calls: Vec<String>,
    pub is_async: bool,
}

impl FunctionDef {
    /// Last segment of the local name (`method` for `Class.method`)
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Parameters plus the return slot
    pub fn annotatable_slots(&self) -> usize {
        self.parameters.len() + 1
    }

    pub fn annotated_slots(&self) -> usize {
        self.parameters
            .iter()
            .filter(|p| p.annotation.is_some())
            .count()
            + usize::from(self.return_annotation.is_some())
    }

    /// Slot names lacking an annotation; the return slot is `return`
    pub fn unannotated_slots(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .parameters
            .iter()
            .filter(|p| p.annotation.is_none())
            .map(|p| p.name.clone())
            .collect();
        if self.return_annotation.is_none() {
            missing.push("return".to_string());
        }
        missing
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub lines: LineRange,
    pub methods: Vec<String>,
}

/// Syntactic hazard recognised while parsing one file
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AntipatternRule {
    /// `eval(...)` or `exec(...)`; `user_input` when an argument reads
    /// `input()` or request data (`.form`, `.args`, `.json`, `.data`)
    DangerousEval { call: String, user_input: bool },
    /// `except:` without an exception type
    BareExcept { pass_only: bool, body_statements: usize },
    /// A loop nested deeper than `threshold` loops
    NestedLoops {
        depth: usize,
        threshold: usize,
        loop_kinds: Vec<String>,
    },
    /// List, dict or set literal as a parameter default
    MutableDefault {
        function: String,
        parameter: String,
        default_kind: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Antipattern {
    pub lines: LineRange,
    pub rule: AntipatternRule,
}

/// Everything the parser extracts from one file
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceUnit {
    /// File id: root-relative, `/`-separated
    pub path: String,
    pub language: Language,
    pub imports: Vec<Import>,
    pub functions: Vec<FunctionDef>,
    pub classes: Vec<ClassDef>,
    /// Call references outside any function body
    pub module_calls: Vec<String>,
    /// Identifiers referenced outside import statements
    pub referenced_names: BTreeSet<String>,
    /// String entries of `__all__`
    pub exported_names: BTreeSet<String>,
    pub antipatterns: Vec<Antipattern>,
    pub status: ParseStatus,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            imports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            module_calls: Vec::new(),
            referenced_names: BTreeSet::new(),
            exported_names: BTreeSet::new(),
            antipatterns: Vec::new(),
            status: ParseStatus::Ok,
        }
    }

    /// A unit carrying only a failure status
    pub fn failed(path: impl Into<String>, language: Language, status: ParseStatus) -> Self {
        Self {
            status,
            ..Self::new(path, language)
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.status.is_ok()
    }

    pub fn module_name(&self) -> String {
        module_name_for(&self.path)
    }

    pub fn is_package_init(&self) -> bool {
        self.path == "__init__.py" || self.path.ends_with("/__init__.py")
    }
}

pub fn qualified_name(file: &str, local: &str) -> String {
    format!("{file}::{local}")
}

/// Split `<file>::<local>` into its two halves
pub fn split_qualified(qualified: &str) -> Option<(&str, &str)> {
    qualified.split_once("::")
}

/// Dotted module name for a file id: `pkg/mod.py` -> `pkg.mod`,
/// `pkg/__init__.py` -> `pkg`
pub fn module_name_for(file_id: &str) -> String {
    let stem = file_id
        .strip_suffix(".pyw")
        .or_else(|| file_id.strip_suffix(".py"))
        .unwrap_or(file_id);
    let dotted = stem.replace('/', ".");
    if dotted == "__init__" {
        return String::new();
    }
    dotted
        .strip_suffix(".__init__")
        .map(str::to_string)
        .unwrap_or(dotted)
}

/// Root-relative, `/`-separated identifier for a file under `root`
pub fn file_id_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_module_name_for_plain_file() {
        assert_eq!(module_name_for("pkg/core.py"), "pkg.core");
        assert_eq!(module_name_for("main.py"), "main");
    }

    #[test]
    fn test_module_name_for_package_init() {
        assert_eq!(module_name_for("pkg/sub/__init__.py"), "pkg.sub");
        assert_eq!(module_name_for("__init__.py"), "");
    }

    #[test]
    fn test_file_id_is_root_relative() {
        let root = PathBuf::from("/work/project");
        let file = root.join("pkg").join("core.py");
        assert_eq!(file_id_for(&root, &file), "pkg/core.py");
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path("a/b.py"), Language::Python);
        assert_eq!(Language::from_path("a/b.rs"), Language::Unknown);
        assert_eq!(Language::from_path("Makefile"), Language::Unknown);
    }

    #[test]
    fn test_annotation_slots() {
        let func = FunctionDef {
            qualified_name: qualified_name("a.py", "f"),
            name: "f".to_string(),
            class_name: None,
            file: "a.py".to_string(),
            lines: LineRange::new(1, 2),
            receiver: None,
            parameters: vec![
                Parameter {
                    name: "x".to_string(),
                    annotation: Some("int".to_string()),
                },
                Parameter {
                    name: "y".to_string(),
                    annotation: None,
                },
            ],
            return_annotation: None,
            complexity: 1,
            calls: vec![],
            is_async: false,
        };
        assert_eq!(func.annotatable_slots(), 3);
        assert_eq!(func.annotated_slots(), 1);
        assert_eq!(func.unannotated_slots(), vec!["y", "return"]);
    }

    #[test]
    fn test_module_binding_uses_first_segment() {
        let import = Import::module("a.py", "os.path", None, 1);
        assert_eq!(import.module_binding(), Some("os"));
        let aliased = Import::module("a.py", "numpy", Some("np".to_string()), 2);
        assert_eq!(aliased.module_binding(), Some("np"));
    }
}
