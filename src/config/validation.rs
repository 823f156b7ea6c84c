//! Configuration validation with error accumulation.
//!
//! Each section is checked by its own function returning a
//! [`ConfigValidation`]; [`validate`] combines them so every problem is
//! reported in one run. [`validate_config`] converts the result into a
//! single [`AnalysisError::Configuration`] whose message lists every
//! problem, each prefixed with its field path (`impact.upstream_weight: ...`).

use std::fmt;

use stillwater::{NonEmptyVec, Validation};

use super::{AnalysisConfig, FilesConfig, ImpactConfig, ParallelConfig, ThresholdsConfig};
use crate::core::{AnalysisError, Result};

/// One configuration problem, tied to the field it concerns
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type ConfigValidation<T> = Validation<T, NonEmptyVec<ConfigIssue>>;

/// Validate the whole config, accumulating all problems
pub fn validate(config: &AnalysisConfig) -> ConfigValidation<()> {
    combine_validations(vec![
        validate_thresholds(&config.thresholds),
        validate_impact(&config.impact),
        validate_entry_points(config),
        validate_parallel(&config.parallel),
        validate_files(&config.files),
    ])
}

/// [`validate`] as a `Result` for fail-fast callers
pub fn validate_config(config: &AnalysisConfig) -> Result<()> {
    match validate(config) {
        Validation::Success(()) => Ok(()),
        Validation::Failure(issues) => {
            let message = issues
                .into_iter()
                .map(|issue| issue.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(AnalysisError::configuration(message))
        }
    }
}

fn validate_thresholds(thresholds: &ThresholdsConfig) -> ConfigValidation<()> {
    let mut issues = Vec::new();
    if thresholds.complexity == 0 {
        issues.push(ConfigIssue::new("thresholds.complexity", "must be at least 1"));
    }
    let coverage = thresholds.min_type_coverage;
    if !(0.0..=1.0).contains(&coverage) {
        issues.push(ConfigIssue::new(
            "thresholds.min_type_coverage",
            format!("expected 0.0-1.0, got {coverage}"),
        ));
    }
    from_issues(issues)
}

fn validate_impact(impact: &ImpactConfig) -> ConfigValidation<()> {
    let mut validations: Vec<ConfigValidation<()>> = [
        ("impact.upstream_weight", impact.upstream_weight),
        ("impact.downstream_weight", impact.downstream_weight),
        ("impact.complexity_weight", impact.complexity_weight),
        ("impact.report_threshold", impact.report_threshold),
    ]
    .into_iter()
    .map(|(field, value)| non_negative(field, value))
    .collect();

    validations.extend(impact.targets.iter().enumerate().map(|(i, target)| {
        if target.trim().is_empty() {
            failure(ConfigIssue::new(
                format!("impact.targets[{i}]"),
                "empty function name",
            ))
        } else {
            Validation::Success(())
        }
    }));

    combine_validations(validations)
}

fn validate_entry_points(config: &AnalysisConfig) -> ConfigValidation<()> {
    match config.entry_points.compile() {
        Ok(_) => Validation::Success(()),
        Err(AnalysisError::Configuration(message)) => failure(split_field(&message)),
        Err(other) => failure(ConfigIssue::new("entry_points", other.to_string())),
    }
}

fn validate_parallel(parallel: &ParallelConfig) -> ConfigValidation<()> {
    let mut issues = Vec::new();
    if parallel.max_concurrency == Some(0) {
        issues.push(ConfigIssue::new("parallel.max_concurrency", "must be at least 1"));
    }
    if parallel.parse_timeout_ms == 0 {
        issues.push(ConfigIssue::new(
            "parallel.parse_timeout_ms",
            "must be greater than 0",
        ));
    }
    from_issues(issues)
}

fn validate_files(files: &FilesConfig) -> ConfigValidation<()> {
    let issues = [("files.include", &files.include), ("files.exclude", &files.exclude)]
        .into_iter()
        .flat_map(|(field, patterns)| {
            patterns.iter().filter_map(move |pattern| {
                glob::Pattern::new(pattern)
                    .err()
                    .map(|e| ConfigIssue::new(field, format!("invalid glob '{pattern}': {e}")))
            })
        })
        .collect();
    from_issues(issues)
}

fn non_negative(field: &str, value: f64) -> ConfigValidation<()> {
    if value.is_finite() && value >= 0.0 {
        Validation::Success(())
    } else {
        failure(ConfigIssue::new(
            field,
            format!("expected a finite non-negative number, got {value}"),
        ))
    }
}

/// Merge validations, keeping every failure in order
fn combine_validations(validations: Vec<ConfigValidation<()>>) -> ConfigValidation<()> {
    let issues = validations
        .into_iter()
        .flat_map(|v| match v {
            Validation::Success(()) => Vec::new(),
            Validation::Failure(issues) => issues.into_iter().collect(),
        })
        .collect();
    from_issues(issues)
}

fn from_issues(issues: Vec<ConfigIssue>) -> ConfigValidation<()> {
    match NonEmptyVec::from_vec(issues) {
        Some(issues) => Validation::Failure(issues),
        None => Validation::Success(()),
    }
}

fn failure(issue: ConfigIssue) -> ConfigValidation<()> {
    Validation::Failure(NonEmptyVec::new(issue, Vec::new()))
}

/// `field: message` text from an existing error, split back into parts
fn split_field(message: &str) -> ConfigIssue {
    match message.split_once(": ") {
        Some((field, rest)) => ConfigIssue::new(field, rest),
        None => ConfigIssue::new("entry_points", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issues(config: &AnalysisConfig) -> Vec<ConfigIssue> {
        match validate(config) {
            Validation::Success(()) => Vec::new(),
            Validation::Failure(issues) => issues.into_iter().collect(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&AnalysisConfig::default()).is_success());
        assert!(validate_config(&AnalysisConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_accumulated() {
        let mut config = AnalysisConfig::default();
        config.thresholds.min_type_coverage = 1.5;
        config.impact.downstream_weight = f64::NAN;
        config.parallel.parse_timeout_ms = 0;
        config.files.exclude.push("[".to_string());

        let issues = issues(&config);
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "thresholds.min_type_coverage",
                "impact.downstream_weight",
                "parallel.parse_timeout_ms",
                "files.exclude",
            ]
        );
    }

    #[test]
    fn test_failures_from_separate_sections_combine() {
        let mut config = AnalysisConfig::default();
        config.thresholds.complexity = 0;
        config.impact.report_threshold = -1.0;
        config.parallel.max_concurrency = Some(0);

        assert!(validate(&config).is_failure());
        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("thresholds.complexity: must be at least 1"));
        assert!(message.contains("impact.report_threshold: expected a finite non-negative number, got -1"));
        assert!(message.contains("parallel.max_concurrency: must be at least 1"));
    }

    #[test]
    fn test_bad_entry_pattern_reported() {
        let mut config = AnalysisConfig::default();
        config.entry_points.patterns.push("test_[".to_string());
        let issues = issues(&config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "entry_points.patterns");
    }

    #[test]
    fn test_blank_impact_target_reported() {
        let mut config = AnalysisConfig::default();
        config.impact.targets.push(String::new());
        assert_eq!(
            issues(&config),
            vec![ConfigIssue::new("impact.targets[0]", "empty function name")]
        );
    }
}
