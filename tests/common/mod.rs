// Test utility module for depsight integration tests
#![allow(dead_code)]

use depsight::{
    analyze_sources, AnalysisConfig, AnalysisContext, AnalysisReport, FindingKind, GraphBuilder,
    Issue, SourceUnit,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `files` (file id, contents) under a fresh temporary root
pub fn write_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (id, contents) in files {
        write_file(dir.path(), id, contents);
    }
    dir
}

pub fn write_file(root: &Path, id: &str, contents: &str) {
    let path = root.join(id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write fixture");
}

pub fn parse(id: &str, source: &str) -> SourceUnit {
    depsight::analyze_source(source, id, 0).expect("analyzer available")
}

/// Parse every file and build the graphs
pub fn context(files: &[(&str, &str)]) -> AnalysisContext {
    let mut builder = GraphBuilder::new();
    builder.add_units(files.iter().map(|(id, source)| parse(id, source)));
    builder.build().expect("graphs build")
}

pub fn analyze(files: &[(&str, &str)], config: &AnalysisConfig) -> AnalysisReport {
    let sources = files
        .iter()
        .map(|(id, source)| (id.to_string(), source.to_string()))
        .collect();
    analyze_sources(sources, config).expect("analysis succeeds")
}

pub fn issues_of(report: &AnalysisReport, kind: FindingKind) -> Vec<&Issue> {
    report
        .issues
        .iter()
        .filter(|issue| issue.kind() == kind)
        .collect()
}

/// Issues whose own or merged evidence is of `kind`
pub fn issues_mentioning(report: &AnalysisReport, kind: FindingKind) -> Vec<&Issue> {
    report
        .issues
        .iter()
        .filter(|issue| {
            issue.kind() == kind || issue.related.iter().any(|evidence| evidence.kind() == kind)
        })
        .collect()
}
