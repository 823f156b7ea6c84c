mod common;

use common::write_project;
use depsight::config::{parse_and_validate_config, CONFIG_FILE_NAME};
use depsight::{load_config, load_config_from_path, AnalysisConfig, AnalysisError};
use indoc::indoc;

#[test]
fn test_missing_config_file_means_defaults() {
    let dir = write_project(&[("a.py", "")]);
    assert_eq!(load_config(dir.path()).unwrap(), AnalysisConfig::default());
}

#[test]
fn test_config_file_in_root_is_used() {
    let dir = write_project(&[(
        CONFIG_FILE_NAME,
        indoc! {r#"
            [thresholds]
            complexity = 15

            [entry_points]
            names = ["serve"]
            patterns = []
            module_level = false

            [files]
            exclude = ["migrations/**"]
        "#},
    )]);

    let config = load_config(dir.path()).unwrap();
    assert_eq!(config.thresholds.complexity, 15);
    assert_eq!(config.thresholds.min_type_coverage, 0.5);
    assert_eq!(config.entry_points.names, vec!["serve"]);
    assert!(!config.entry_points.module_level);
    assert_eq!(config.files.include, vec!["**/*.py"]);
    assert_eq!(config.files.exclude, vec!["migrations/**"]);
}

#[test]
fn test_explicit_path_must_exist() {
    let dir = write_project(&[]);
    let err = load_config_from_path(&dir.path().join("custom.toml")).unwrap_err();
    assert!(matches!(err, AnalysisError::FileSystem { .. }));
}

#[test]
fn test_every_problem_is_reported_at_once() {
    let err = parse_and_validate_config(indoc! {r#"
        [thresholds]
        complexity = 0
        min_type_coverage = 1.5

        [impact]
        upstream_weight = -2.0

        [entry_points]
        names = [""]
    "#})
    .unwrap_err();

    let message = err.to_string();
    for field in [
        "thresholds.complexity",
        "thresholds.min_type_coverage",
        "impact.upstream_weight",
        "entry_points",
    ] {
        assert!(message.contains(field), "{field} missing from: {message}");
    }
}

#[test]
fn test_malformed_toml_is_configuration_error() {
    let err = parse_and_validate_config("[thresholds\ncomplexity = ").unwrap_err();
    assert!(matches!(err, AnalysisError::Configuration(_)));
}
