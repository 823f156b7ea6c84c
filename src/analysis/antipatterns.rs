use crate::core::{
    Antipattern, AntipatternRule, Category, Evidence, Issue, Location, Severity, SourceUnit,
};

/// Issues for the antipatterns the parser recorded in one file.
///
/// File-local like the metric findings, so they survive a cancelled run.
pub fn antipattern_findings(unit: &SourceUnit) -> Vec<Issue> {
    if !unit.is_parsed() {
        return Vec::new();
    }
    unit.antipatterns
        .iter()
        .map(|found| antipattern_issue(&unit.path, found))
        .collect()
}

fn antipattern_issue(file: &str, found: &Antipattern) -> Issue {
    let location = Location::file(file).with_lines(found.lines);
    let (category, severity, location, description) = match &found.rule {
        AntipatternRule::DangerousEval { call, user_input } => (
            Category::Security,
            if *user_input {
                Severity::Critical
            } else {
                Severity::Warning
            },
            location.with_symbol(call),
            if *user_input {
                format!("{call}() evaluates code built from user input")
            } else {
                format!("{call}() executes arbitrary code; prefer ast.literal_eval or real parsing")
            },
        ),
        AntipatternRule::BareExcept { pass_only, .. } => (
            Category::Correctness,
            if *pass_only {
                Severity::Critical
            } else {
                Severity::Warning
            },
            location,
            if *pass_only {
                "Bare 'except: pass' silences every error, including KeyboardInterrupt".to_string()
            } else {
                "Bare 'except:' also catches SystemExit and KeyboardInterrupt".to_string()
            },
        ),
        AntipatternRule::NestedLoops {
            depth, threshold, ..
        } => (
            Category::Performance,
            Severity::Warning,
            location,
            format!("Loop nested {depth} levels deep (limit {threshold})"),
        ),
        AntipatternRule::MutableDefault {
            function,
            parameter,
            default_kind,
        } => (
            Category::Correctness,
            Severity::Warning,
            location.with_symbol(format!("{function}({parameter})")),
            format!(
                "Parameter '{parameter}' of '{function}' defaults to a shared {default_kind}; \
                 use None and create it inside the function"
            ),
        ),
    };

    Issue::new(
        category,
        severity,
        location,
        Evidence::Antipattern {
            pattern: found.rule.clone(),
        },
        description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyze_source;
    use crate::core::{FindingKind, ParseStatus};
    use indoc::indoc;

    fn findings(source: &str) -> Vec<Issue> {
        antipattern_findings(&analyze_source(source, "risky.py", 0).unwrap())
    }

    #[test]
    fn test_categories_and_severities() {
        let issues = findings(indoc! {"
            def load(blob, cache={}):
                try:
                    return eval(blob)
                except:
                    pass

            def ask():
                return eval(input())
        "});
        let summary: Vec<_> = issues
            .iter()
            .map(|i| (i.category, i.severity, i.location.lines.map(|l| l.start)))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Category::Correctness, Severity::Warning, Some(1)),
                (Category::Security, Severity::Warning, Some(3)),
                (Category::Correctness, Severity::Critical, Some(4)),
                (Category::Security, Severity::Critical, Some(8)),
            ]
        );
        assert!(issues.iter().all(|i| i.kind() == FindingKind::Antipattern));
        assert_eq!(issues[0].location.symbol.as_deref(), Some("load(cache)"));
    }

    #[test]
    fn test_nested_loops_are_performance() {
        let issues = findings(indoc! {"
            for a in range(3):
                for b in range(3):
                    for c in range(3):
                        for d in range(3):
                            print(a, b, c, d)
        "});
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::Performance);
        assert!(matches!(
            &issues[0].evidence,
            Evidence::Antipattern {
                pattern: AntipatternRule::NestedLoops { depth: 4, .. }
            }
        ));
    }

    #[test]
    fn test_unparsed_unit_has_no_findings() {
        let unit = SourceUnit::failed("broken.py", crate::core::Language::Python, ParseStatus::TimedOut);
        assert!(antipattern_findings(&unit).is_empty());
    }
}
