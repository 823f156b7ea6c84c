//! The report handed to external collaborators: normalized issues plus
//! aggregate counters and per-file statuses.

pub mod aggregator;

pub use aggregator::{aggregate, canonical_order};

use crate::core::{Category, Issue, Language, ParseStatus, Severity};
use crate::metrics::FileMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileStatus {
    pub file: String,
    pub language: Language,
    #[serde(flatten)]
    pub status: ParseStatus,
    /// Present for parsed files only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<FileMetrics>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    /// Files parsed successfully
    pub files_analyzed: usize,
    /// Files with a syntax error or a parse timeout
    pub files_failed: usize,
    /// Files never parsed because the run was cancelled
    pub files_skipped: usize,
    pub total_issues: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_category: BTreeMap<Category, usize>,
}

impl Summary {
    fn compute(issues: &[Issue], files: &[FileStatus]) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> =
            [Severity::Critical, Severity::Warning, Severity::Suggestion]
                .into_iter()
                .map(|s| (s, 0))
                .collect();
        let mut by_category: BTreeMap<Category, usize> = [
            Category::Correctness,
            Category::Security,
            Category::Performance,
            Category::Maintainability,
            Category::Style,
        ]
        .into_iter()
        .map(|c| (c, 0))
        .collect();

        for issue in issues {
            *by_severity.entry(issue.severity).or_default() += 1;
            *by_category.entry(issue.category).or_default() += 1;
        }

        let count = |pred: fn(&ParseStatus) -> bool| files.iter().filter(|f| pred(&f.status)).count();

        Self {
            files_analyzed: count(|s| matches!(s, ParseStatus::Ok)),
            files_failed: count(|s| matches!(s, ParseStatus::ParseError { .. } | ParseStatus::TimedOut)),
            files_skipped: count(|s| matches!(s, ParseStatus::Cancelled)),
            total_issues: issues.len(),
            by_severity,
            by_category,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub issues: Vec<Issue>,
    pub summary: Summary,
    /// Sorted by file id
    pub files: Vec<FileStatus>,
    /// Set when the run was cancelled; graph-derived findings are then absent
    pub partial: bool,
}

impl AnalysisReport {
    /// Deduplicate and order `issues`, then count them
    pub fn new(issues: Vec<Issue>, mut files: Vec<FileStatus>, partial: bool) -> Self {
        let issues = aggregate(issues);
        files.sort_by(|a, b| a.file.cmp(&b.file));
        let summary = Summary::compute(&issues, &files);
        Self {
            issues,
            summary,
            files,
            partial,
        }
    }

    pub fn file_status(&self, file: &str) -> Option<&FileStatus> {
        self.files.iter().find(|f| f.file == file)
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
