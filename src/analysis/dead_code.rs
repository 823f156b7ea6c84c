//! Dead code detection by forward reachability over the call graph.
//!
//! Calls made through dynamic dispatch (`getattr`, callbacks stored in
//! containers, framework registration) are invisible to the parser, so a
//! function only reached that way is reported as dead. Declare such
//! functions as entry points.

use crate::config::EntryPointMatcher;
use crate::core::{Category, Evidence, FunctionDef, Issue, Location, Severity};
use crate::graph::AnalysisContext;
use std::collections::BTreeSet;

/// Qualified names of every function treated as externally invoked
pub fn collect_entry_points(ctx: &AnalysisContext, matcher: &EntryPointMatcher) -> BTreeSet<String> {
    let mut entry_points: BTreeSet<String> = ctx
        .registry()
        .iter()
        .filter(|f| matcher.matches(f))
        .map(|f| f.qualified_name.clone())
        .collect();

    if matcher.includes_module_level() {
        entry_points.extend(ctx.module_roots().iter().cloned());
    }
    entry_points
}

/// Functions neither entry points nor reachable from one, by qualified name
pub fn find_dead_functions<'a>(
    ctx: &'a AnalysisContext,
    matcher: &EntryPointMatcher,
) -> Vec<&'a FunctionDef> {
    let entry_points = collect_entry_points(ctx, matcher);
    let reachable = ctx
        .call_graph()
        .reachable_from(entry_points.iter().map(String::as_str));

    log::debug!(
        "{} entry points reach {} of {} functions",
        entry_points.len(),
        reachable.len(),
        ctx.registry().len()
    );

    ctx.registry()
        .iter()
        .filter(|f| !reachable.contains(&f.qualified_name))
        .collect()
}

pub fn dead_code_findings(ctx: &AnalysisContext, matcher: &EntryPointMatcher) -> Vec<Issue> {
    find_dead_functions(ctx, matcher)
        .into_iter()
        .map(|f| {
            Issue::new(
                Category::Maintainability,
                Severity::Warning,
                Location::file(&f.file)
                    .with_lines(f.lines)
                    .with_symbol(&f.qualified_name),
                Evidence::DeadCode {
                    function: f.qualified_name.clone(),
                    callers: Vec::new(),
                },
                format!(
                    "Function '{}' is not reachable from any entry point",
                    f.name
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyze_source;
    use crate::config::EntryPointSpec;
    use crate::graph::GraphBuilder;
    use indoc::indoc;

    fn context(source: &str) -> AnalysisContext {
        let mut builder = GraphBuilder::new();
        builder.add_unit(analyze_source(source, "app.py", 0).unwrap());
        builder.build().unwrap()
    }

    fn dead_names(ctx: &AnalysisContext, spec: EntryPointSpec) -> Vec<String> {
        let matcher = spec.compile().unwrap();
        find_dead_functions(ctx, &matcher)
            .into_iter()
            .map(|f| f.name.clone())
            .collect()
    }

    #[test]
    fn test_uncalled_helper_is_dead() {
        let ctx = context(indoc! {"
            def main():
                work()

            def work():
                pass

            def helper():
                pass
        "});
        assert_eq!(dead_names(&ctx, EntryPointSpec::default()), vec!["helper"]);

        let matcher = EntryPointSpec::default().compile().unwrap();
        let issues = dead_code_findings(&ctx, &matcher);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(
            issues[0].evidence,
            Evidence::DeadCode {
                function: "app.py::helper".to_string(),
                callers: vec![],
            }
        );
    }

    #[test]
    fn test_deep_chain_is_alive() {
        let ctx = context(indoc! {"
            def a():
                b()
            def b():
                c()
            def c():
                d()
            def d():
                pass
        "});
        let spec = EntryPointSpec::empty().with_names(["a"]);
        assert!(dead_names(&ctx, spec).is_empty());
    }

    #[test]
    fn test_module_level_calls_are_entry_points() {
        let source = indoc! {"
            def run():
                pass

            run()
        "};
        let ctx = context(source);
        assert!(dead_names(&ctx, EntryPointSpec::default()).is_empty());

        let spec = EntryPointSpec {
            module_level: false,
            ..EntryPointSpec::default()
        };
        assert_eq!(dead_names(&ctx, spec), vec!["run"]);
    }

    #[test]
    fn test_patterns_and_dunders() {
        let ctx = context(indoc! {"
            class Model:
                def __init__(self):
                    self.setup()

                def setup(self):
                    pass

            def test_model():
                pass
        "});
        assert!(dead_names(&ctx, EntryPointSpec::default()).is_empty());
        assert_eq!(
            dead_names(&ctx, EntryPointSpec::empty()),
            vec!["Model.__init__", "Model.setup", "test_model"]
        );
    }

    #[test]
    fn test_mutual_recursion_without_entry_is_dead() {
        let ctx = context(indoc! {"
            def ping():
                pong()

            def pong():
                ping()
        "});
        assert_eq!(
            dead_names(&ctx, EntryPointSpec::empty()),
            vec!["ping", "pong"]
        );
    }
}
