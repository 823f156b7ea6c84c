use crate::core::{Category, Evidence, ImportKind, Issue, LineRange, Location, Severity};
use crate::graph::{AnalysisContext, ModuleInfo};

/// Imported names never referenced in their file.
///
/// Package `__init__.py` files, wildcard imports and names re-exported
/// through `__all__` are exempt: importing is their purpose.
pub fn unused_import_findings(ctx: &AnalysisContext) -> Vec<Issue> {
    ctx.modules()
        .iter()
        .filter(|(_, module)| !module.is_package_init)
        .flat_map(|(file, module)| unused_in_module(file, module))
        .collect()
}

fn unused_in_module(file: &str, module: &ModuleInfo) -> Vec<Issue> {
    let is_used = |binding: &str| {
        module.referenced_names.contains(binding) || module.exported_names.contains(binding)
    };

    let mut issues = Vec::new();
    for import in &module.imports {
        match import.kind {
            ImportKind::Module => {
                if let Some(binding) = import.module_binding() {
                    if !is_used(binding) {
                        issues.push(unused_issue(file, import.line, &import.module, binding));
                    }
                }
            }
            // Submodule imports discovered during resolution carry no names
            ImportKind::From if import.wildcard || import.names.is_empty() => {}
            ImportKind::From => {
                let source = import.display_module();
                for name in &import.names {
                    if !is_used(name.binding()) {
                        issues.push(unused_issue(file, import.line, &source, name.binding()));
                    }
                }
            }
        }
    }
    issues
}

fn unused_issue(file: &str, line: usize, module: &str, binding: &str) -> Issue {
    Issue::new(
        Category::Style,
        Severity::Suggestion,
        Location::file(file)
            .with_lines(LineRange::single(line))
            .with_symbol(binding),
        Evidence::UnusedImport {
            module: module.to_string(),
            name: binding.to_string(),
        },
        format!("'{binding}' is imported from '{module}' but never used"),
    )
}
