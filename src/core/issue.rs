//! Findings exchanged with external collaborators.
//!
//! Every [`Issue`] carries structured [`Evidence`] so a consumer can explain it
//! without access to the graphs it was derived from.

use super::{AntipatternRule, LineRange};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Correctness,
    Security,
    Performance,
    Maintainability,
    Style,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Correctness => "correctness",
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Maintainability => "maintainability",
            Category::Style => "style",
        };
        write!(f, "{name}")
    }
}

/// Ordered most severe first, so an ascending sort lists critical issues first
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
            ImpactLevel::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

impl ImpactLevel {
    /// Bands: low < 10 <= medium < 25 <= high < 50 <= critical
    pub fn from_score(score: f64) -> Self {
        if score >= 50.0 {
            ImpactLevel::Critical
        } else if score >= 25.0 {
            ImpactLevel::High
        } else if score >= 10.0 {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        }
    }
}

/// Detector that produced a finding. The declaration order is the tie-break
/// used when sorting and deduplicating.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    DependencyCycle,
    DeadCode,
    Impact,
    Antipattern,
    Complexity,
    UnusedImport,
    TypeCoverage,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<LineRange>,
    /// Qualified function name or rendered cycle the finding is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Location {
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            lines: None,
            symbol: None,
        }
    }

    pub fn with_lines(mut self, lines: LineRange) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImpactScore {
    pub function: String,
    pub upstream: usize,
    pub downstream: usize,
    pub complexity: u32,
    pub score: f64,
}

impl ImpactScore {
    pub fn level(&self) -> ImpactLevel {
        ImpactLevel::from_score(self.score)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    DependencyCycle {
        /// Canonical rotation, starting at the smallest file id
        cycle: Vec<String>,
    },
    DeadCode {
        function: String,
        callers: Vec<String>,
    },
    Impact {
        score: ImpactScore,
        level: ImpactLevel,
        max_depth: Option<usize>,
        upstream_files: Vec<String>,
        downstream_files: Vec<String>,
        affected_files: Vec<String>,
    },
    Complexity {
        function: String,
        complexity: u32,
        threshold: u32,
    },
    TypeCoverage {
        annotated: usize,
        total: usize,
        coverage: f64,
        threshold: f64,
        /// `qualified_name: slot` for every missing annotation
        unannotated: Vec<String>,
    },
    UnusedImport {
        module: String,
        name: String,
    },
    Antipattern {
        pattern: AntipatternRule,
    },
}

impl Evidence {
    pub fn kind(&self) -> FindingKind {
        match self {
            Evidence::DependencyCycle { .. } => FindingKind::DependencyCycle,
            Evidence::DeadCode { .. } => FindingKind::DeadCode,
            Evidence::Impact { .. } => FindingKind::Impact,
            Evidence::Complexity { .. } => FindingKind::Complexity,
            Evidence::TypeCoverage { .. } => FindingKind::TypeCoverage,
            Evidence::UnusedImport { .. } => FindingKind::UnusedImport,
            Evidence::Antipattern { .. } => FindingKind::Antipattern,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub category: Category,
    pub severity: Severity,
    pub location: Location,
    pub evidence: Evidence,
    pub description: String,
    /// Evidence of findings merged into this one during deduplication
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<Evidence>,
}

impl Issue {
    pub fn new(
        category: Category,
        severity: Severity,
        location: Location,
        evidence: Evidence,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            location,
            evidence,
            description: description.into(),
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> FindingKind {
        self.evidence.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_sorts_critical_first() {
        let mut severities = vec![Severity::Suggestion, Severity::Critical, Severity::Warning];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::Warning, Severity::Suggestion]
        );
    }

    #[test]
    fn test_impact_level_bands() {
        assert_eq!(ImpactLevel::from_score(0.0), ImpactLevel::Low);
        assert_eq!(ImpactLevel::from_score(9.99), ImpactLevel::Low);
        assert_eq!(ImpactLevel::from_score(10.0), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_score(25.0), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_score(50.0), ImpactLevel::Critical);
    }

    #[test]
    fn test_evidence_serializes_with_kind_tag() {
        let evidence = Evidence::DependencyCycle {
            cycle: vec!["a.py".to_string(), "b.py".to_string()],
        };
        let json = serde_json::to_value(&evidence).unwrap();
        assert_eq!(json["kind"], "dependency_cycle");
        assert_eq!(json["cycle"][1], "b.py");
    }
}
