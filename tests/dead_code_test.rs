mod common;

use common::{analyze, context, issues_mentioning};
use depsight::analysis::find_dead_functions;
use depsight::{AnalysisConfig, EntryPointSpec, Evidence, FindingKind, Severity};
use indoc::indoc;
use proptest::prelude::*;

fn dead(files: &[(&str, &str)], spec: EntryPointSpec) -> Vec<String> {
    let ctx = context(files);
    let matcher = spec.compile().unwrap();
    find_dead_functions(&ctx, &matcher)
        .into_iter()
        .map(|f| f.qualified_name.clone())
        .collect()
}

#[test]
fn test_helper_scenario_yields_one_warning() {
    let report = analyze(
        &[(
            "app.py",
            indoc! {"
                def main():
                    run()

                def run():
                    return 1

                def helper():
                    return 2
            "},
        )],
        &AnalysisConfig::default(),
    );

    let dead = issues_mentioning(&report, FindingKind::DeadCode);
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].severity, Severity::Warning);
    assert_eq!(dead[0].location.symbol.as_deref(), Some("app.py::helper"));
    assert!(matches!(
        &dead[0].evidence,
        Evidence::DeadCode { function, .. } if function == "app.py::helper"
    ));
}

#[test]
fn test_reachability_crosses_files() {
    let files = [
        (
            "cli.py",
            indoc! {"
                from service import handle

                def main():
                    handle()
            "},
        ),
        (
            "service.py",
            indoc! {"
                from storage import save

                def handle():
                    save()

                def legacy():
                    save()
            "},
        ),
        (
            "storage.py",
            indoc! {"
                def save():
                    pass
            "},
        ),
    ];
    assert_eq!(dead(&files, EntryPointSpec::default()), vec!["service.py::legacy"]);
}

#[test]
fn test_module_level_calls_and_patterns_are_entry_points() {
    let files = [(
        "tasks.py",
        indoc! {"
            def test_saves():
                check()

            def check():
                pass

            def boot():
                pass

            def orphan():
                pass

            boot()
        "},
    )];

    assert_eq!(dead(&files, EntryPointSpec::default()), vec!["tasks.py::orphan"]);

    let everything: Vec<String> = dead(&files, EntryPointSpec::empty());
    assert_eq!(everything.len(), 4);
}

#[test]
fn test_explicit_entry_names() {
    let files = [(
        "jobs.py",
        indoc! {"
            def nightly():
                cleanup()

            def cleanup():
                pass
        "},
    )];
    assert_eq!(
        dead(&files, EntryPointSpec::empty()),
        vec!["jobs.py::cleanup", "jobs.py::nightly"]
    );
    assert!(dead(&files, EntryPointSpec::empty().with_names(["nightly"])).is_empty());
    assert!(dead(&files, EntryPointSpec::empty().with_names(["jobs.py::nightly"])).is_empty());
}

#[test]
fn test_fallback_definitions_under_try_are_functions() {
    let files = [(
        "m.py",
        indoc! {"
            def helper():
                return 1

            try:
                from fast import impl
            except ImportError:
                def impl():
                    return helper()
        "},
    )];
    let module_level_only = EntryPointSpec {
        module_level: true,
        ..EntryPointSpec::empty()
    };

    assert_eq!(
        dead(&files, module_level_only.clone()),
        vec!["m.py::helper", "m.py::impl"]
    );
    assert!(dead(&files, module_level_only.with_names(["impl"])).is_empty());
}

fn chain_source(len: usize) -> String {
    (0..len)
        .map(|i| {
            if i + 1 < len {
                format!("def f{i}():\n    f{}()\n\n", i + 1)
            } else {
                format!("def f{i}():\n    pass\n\n")
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_everything_downstream_of_an_entry_point_is_live(len in 1usize..15, entry in 0usize..15) {
        let entry = entry % len;
        let source = chain_source(len);
        let dead = dead(
            &[("chain.py", source.as_str())],
            EntryPointSpec::empty().with_names([format!("f{entry}")]),
        );
        let expected: Vec<String> = {
            let mut names: Vec<String> = (0..entry).map(|i| format!("chain.py::f{i}")).collect();
            names.sort();
            names
        };
        prop_assert_eq!(dead, expected);
    }
}
