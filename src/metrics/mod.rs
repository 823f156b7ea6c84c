//! File-local metrics and the threshold findings derived from them.
//!
//! Everything here depends on a single [`SourceUnit`] only, so it is safe to
//! compute for a partial (cancelled) run.

use crate::config::ThresholdsConfig;
use crate::core::{Category, Evidence, Issue, Location, Severity, SourceUnit};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FileMetrics {
    pub functions: usize,
    pub max_complexity: u32,
    pub total_complexity: u32,
    pub annotated_slots: usize,
    pub annotatable_slots: usize,
    /// `None` (N/A) when the file declares no functions
    pub type_coverage: Option<f64>,
}

impl FileMetrics {
    pub fn from_unit(unit: &SourceUnit) -> Self {
        let annotated_slots: usize = unit.functions.iter().map(|f| f.annotated_slots()).sum();
        let annotatable_slots: usize = unit.functions.iter().map(|f| f.annotatable_slots()).sum();

        Self {
            functions: unit.functions.len(),
            max_complexity: unit.functions.iter().map(|f| f.complexity).max().unwrap_or(0),
            total_complexity: unit.functions.iter().map(|f| f.complexity).sum(),
            annotated_slots,
            annotatable_slots,
            type_coverage: type_coverage(annotated_slots, annotatable_slots),
        }
    }
}

pub fn type_coverage(annotated: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| annotated as f64 / total as f64)
}

/// Complexity warnings and the type-coverage suggestion for one parsed file
pub fn metric_findings(unit: &SourceUnit, thresholds: &ThresholdsConfig) -> Vec<Issue> {
    if !unit.is_parsed() {
        return Vec::new();
    }

    let mut issues: Vec<Issue> = unit
        .functions
        .iter()
        .filter(|f| f.complexity > thresholds.complexity)
        .map(|f| {
            Issue::new(
                Category::Maintainability,
                Severity::Warning,
                Location::file(&f.file)
                    .with_lines(f.lines)
                    .with_symbol(&f.qualified_name),
                Evidence::Complexity {
                    function: f.qualified_name.clone(),
                    complexity: f.complexity,
                    threshold: thresholds.complexity,
                },
                format!(
                    "Function '{}' has cyclomatic complexity {} (threshold {})",
                    f.name, f.complexity, thresholds.complexity
                ),
            )
        })
        .collect();

    let metrics = FileMetrics::from_unit(unit);
    if let Some(coverage) = metrics.type_coverage {
        if coverage < thresholds.min_type_coverage {
            let unannotated = unit
                .functions
                .iter()
                .flat_map(|f| {
                    f.unannotated_slots()
                        .into_iter()
                        .map(move |slot| format!("{}: {slot}", f.qualified_name))
                })
                .collect();
            issues.push(Issue::new(
                Category::Maintainability,
                Severity::Suggestion,
                Location::file(&unit.path),
                Evidence::TypeCoverage {
                    annotated: metrics.annotated_slots,
                    total: metrics.annotatable_slots,
                    coverage,
                    threshold: thresholds.min_type_coverage,
                    unannotated,
                },
                format!(
                    "Type hint coverage is {:.0}% ({}/{} slots), below {:.0}%",
                    coverage * 100.0,
                    metrics.annotated_slots,
                    metrics.annotatable_slots,
                    thresholds.min_type_coverage * 100.0
                ),
            ));
        }
    }

    issues
}
