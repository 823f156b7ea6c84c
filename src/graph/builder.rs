//! Merges the parsed source units of a run into the two graphs.
//!
//! This is the synchronization barrier of the pipeline: it needs the complete
//! set of units and runs single-threaded.

use super::context::{AnalysisContext, FunctionRegistry, ModuleInfo};
use super::resolver::{Binding, CallResolver, ImportBindings, ModuleIndex};
use super::{CallGraph, FileDependencyGraph};
use crate::core::{Import, ImportKind, Result, SourceUnit};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug_span;

#[derive(Debug, Default)]
pub struct GraphBuilder {
    units: Vec<SourceUnit>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: SourceUnit) {
        self.units.push(unit);
    }

    pub fn add_units<I: IntoIterator<Item = SourceUnit>>(&mut self, units: I) {
        self.units.extend(units);
    }

    pub fn build(self) -> Result<AnalysisContext> {
        let _span = debug_span!("build_graphs", units = self.units.len()).entered();

        let mut units: Vec<SourceUnit> = self
            .units
            .into_iter()
            .filter(|unit| {
                if !unit.is_parsed() {
                    log::debug!("Leaving {} out of the graphs: {:?}", unit.path, unit.status);
                }
                unit.is_parsed()
            })
            .collect();
        units.sort_by(|a, b| a.path.cmp(&b.path));

        let mut file_graph = FileDependencyGraph::new();
        for unit in &units {
            file_graph.add_file(&unit.path)?;
        }

        let index = ModuleIndex::new(units.iter().map(|u| u.path.as_str()));
        let mut bindings: HashMap<String, ImportBindings> = HashMap::new();
        let mut modules = BTreeMap::new();
        let mut registry = FunctionRegistry::new();

        for unit in &mut units {
            let imports = resolve_imports(&index, std::mem::take(&mut unit.imports));
            for import in &imports {
                match &import.resolved {
                    Some(target) => {
                        file_graph.add_dependency(&unit.path, target)?;
                    }
                    None => log::trace!(
                        "{}:{} import '{}' is external or unresolved",
                        unit.path,
                        import.line,
                        import.display_module()
                    ),
                }
            }
            bindings.insert(unit.path.clone(), import_bindings(&index, &imports));

            for function in std::mem::take(&mut unit.functions) {
                registry.insert(function)?;
            }

            modules.insert(
                unit.path.clone(),
                ModuleInfo {
                    imports,
                    referenced_names: std::mem::take(&mut unit.referenced_names),
                    exported_names: std::mem::take(&mut unit.exported_names),
                    is_package_init: unit.is_package_init(),
                },
            );
        }

        let mut call_graph = CallGraph::new();
        for function in registry.iter() {
            call_graph.add_function(&function.qualified_name)?;
        }

        let resolver = CallResolver::new(&registry, &bindings);
        for function in registry.iter() {
            for reference in &function.calls {
                match resolver.resolve(&function.file, function.class_name.as_deref(), reference) {
                    Some(callee) => {
                        call_graph.add_call(&function.qualified_name, &callee)?;
                    }
                    None => log::trace!(
                        "{}: call '{reference}' unresolved",
                        function.qualified_name
                    ),
                }
            }
        }

        let mut module_roots = BTreeSet::new();
        for unit in &units {
            for reference in &unit.module_calls {
                if let Some(callee) = resolver.resolve(&unit.path, None, reference) {
                    module_roots.insert(callee);
                }
            }
        }

        log::debug!(
            "Built graphs: {} files / {} imports, {} functions / {} calls",
            file_graph.file_count(),
            file_graph.edge_count(),
            call_graph.function_count(),
            call_graph.edge_count()
        );

        Ok(AnalysisContext {
            file_graph,
            call_graph,
            registry,
            modules,
            module_roots,
        })
    }
}

/// Fill in `resolved` and add an import for every `from pkg import name`
/// where `pkg.name` is itself a module.
///
/// When every name of a `from` import is a submodule, the import itself is
/// left unresolved: only the submodules are dependencies, not the package's
/// `__init__.py`.
fn resolve_imports(index: &ModuleIndex, imports: Vec<Import>) -> Vec<Import> {
    let mut resolved = Vec::with_capacity(imports.len());
    for mut import in imports {
        import.resolved = index.resolve(&import);

        let submodules: Vec<Import> = import
            .names
            .iter()
            .filter_map(|name| {
                let target = index.resolve_submodule(&import, &name.name)?;
                let module = if import.module.is_empty() {
                    name.name.clone()
                } else {
                    format!("{}.{}", import.module, name.name)
                };
                let mut submodule = Import::from(
                    &import.source_file,
                    &module,
                    import.level,
                    Vec::new(),
                    false,
                    import.line,
                );
                submodule.resolved = Some(target);
                Some(submodule)
            })
            .collect();

        if !import.names.is_empty() && submodules.len() == import.names.len() {
            import.resolved = None;
        }

        resolved.push(import);
        resolved.extend(submodules);
    }
    resolved
}

fn import_bindings(index: &ModuleIndex, imports: &[Import]) -> ImportBindings {
    let mut bindings = ImportBindings::default();
    for import in imports {
        match import.kind {
            ImportKind::Module => {
                if let Some(target) = &import.resolved {
                    let name = import.alias.clone().unwrap_or_else(|| import.module.clone());
                    bindings.bind(name, Binding::Module(target.clone()));
                }
            }
            ImportKind::From => {
                if import.wildcard {
                    if let Some(target) = &import.resolved {
                        bindings.add_wildcard(target.clone());
                    }
                }
                for name in &import.names {
                    if let Some(submodule) = index.resolve_submodule(import, &name.name) {
                        bindings.bind(name.binding(), Binding::Module(submodule));
                    } else if let Some(target) = &import.resolved {
                        bindings.bind(
                            name.binding(),
                            Binding::Symbol {
                                file: target.clone(),
                                name: name.name.clone(),
                            },
                        );
                    }
                }
            }
        }
    }
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyze_source;
    use indoc::indoc;

    fn build(files: &[(&str, &str)]) -> AnalysisContext {
        let mut builder = GraphBuilder::new();
        for (path, source) in files {
            builder.add_unit(analyze_source(source, path, 0).unwrap());
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_import_edges_only_for_internal_modules() {
        let ctx = build(&[
            ("a.py", "import b\nimport os\nimport a\n"),
            ("b.py", "from c import thing\n"),
            ("c.py", "thing = 1\n"),
        ]);
        assert_eq!(
            ctx.file_graph().edges(),
            vec![("a.py", "b.py"), ("b.py", "c.py")]
        );
        let a_imports = &ctx.modules()["a.py"].imports;
        assert_eq!(a_imports[1].resolved, None);
    }

    #[test]
    fn test_from_package_import_submodule() {
        let ctx = build(&[
            ("app.py", "from pkg import core\n\ndef main():\n    core.run()\n"),
            ("pkg/__init__.py", ""),
            ("pkg/core.py", "def run():\n    pass\n"),
        ]);
        assert_eq!(ctx.dependencies("app.py"), vec!["pkg/core.py"]);
        assert_eq!(
            ctx.call_graph().callees("app.py::main"),
            vec!["pkg/core.py::run"]
        );
    }

    #[test]
    fn test_package_init_edge_kept_for_symbols() {
        let ctx = build(&[
            ("app.py", "from pkg import core, VERSION\n"),
            ("pkg/__init__.py", "VERSION = 1\n"),
            ("pkg/core.py", ""),
        ]);
        assert_eq!(
            ctx.dependencies("app.py"),
            vec!["pkg/__init__.py", "pkg/core.py"]
        );
    }

    #[test]
    fn test_failed_units_left_out() {
        let ctx = build(&[("ok.py", "import bad\n"), ("bad.py", "def (\n")]);
        assert_eq!(ctx.file_graph().files(), vec!["ok.py"]);
        assert_eq!(ctx.file_graph().edge_count(), 0);
    }

    #[test]
    fn test_call_edges_and_module_roots() {
        let ctx = build(&[
            (
                "app.py",
                indoc! {"
                    from util import helper as h

                    class Runner:
                        def run(self):
                            self.step()
                            h()

                        def step(self):
                            pass

                    def main():
                        Runner().run()

                    main()
                "},
            ),
            ("util.py", "def helper():\n    pass\n"),
        ]);

        let calls = ctx.call_graph().edges();
        assert!(calls.contains(&("app.py::Runner.run", "app.py::Runner.step")));
        assert!(calls.contains(&("app.py::Runner.run", "util.py::helper")));
        assert_eq!(
            ctx.module_roots().iter().collect::<Vec<_>>(),
            vec!["app.py::main"]
        );
    }

    #[test]
    fn test_duplicate_file_is_invariant_violation() {
        let mut builder = GraphBuilder::new();
        builder.add_unit(analyze_source("", "a.py", 0).unwrap());
        builder.add_unit(analyze_source("", "a.py", 0).unwrap());
        assert!(builder.build().unwrap_err().is_internal());
    }

    #[test]
    fn test_affected_files_query() {
        let ctx = build(&[
            ("core.py", "def target():\n    pass\n"),
            ("api.py", "from core import target\n\ndef handler():\n    target()\n"),
            ("cli.py", "import api\n\ndef main():\n    api.handler()\n"),
            ("docs.py", "import core\n"),
        ]);
        let affected = ctx.affected_files("core.py::target").unwrap();
        assert_eq!(
            affected.into_iter().collect::<Vec<_>>(),
            vec!["api.py", "cli.py", "docs.py"]
        );
        assert!(ctx.affected_files("nowhere").is_err());
    }
}
