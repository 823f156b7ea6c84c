//! One analysis run, end to end.
//!
//! Discovery, bounded parallel parsing, file-local metrics, then the graph
//! barrier, the concurrent detectors and aggregation. Configuration problems
//! abort before any file is read; per-file failures only show up on the
//! file's status.

pub mod cancel;
pub mod parse_stage;

pub use cancel::CancellationToken;
pub use parse_stage::{SourceFile, SourceText};

use crate::analysis::{antipattern_findings, run_detectors};
use crate::config::AnalysisConfig;
use crate::core::{file_id_for, Issue, Result, SourceUnit};
use crate::findings::{AnalysisReport, FileStatus};
use crate::graph::{AnalysisContext, GraphBuilder};
use crate::io::FileWalker;
use crate::metrics::{metric_findings, FileMetrics};
use std::path::Path;
use tracing::debug_span;

/// Report of a run plus the context it was computed from.
///
/// `context` is `None` for a partial run, since the graphs are never built
/// from an incomplete set of units.
#[derive(Debug)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    pub context: Option<AnalysisContext>,
}

pub fn analyze_project(root: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    analyze_project_with_cancel(root, config, &CancellationToken::new())
}

pub fn analyze_project_with_cancel(
    root: &Path,
    config: &AnalysisConfig,
    token: &CancellationToken,
) -> Result<AnalysisReport> {
    Ok(run_project(root, config, token)?.report)
}

/// Analyse in-memory sources keyed by file id
pub fn analyze_sources(sources: Vec<(String, String)>, config: &AnalysisConfig) -> Result<AnalysisReport> {
    Ok(run_sources(sources, config, &CancellationToken::new())?.report)
}

pub fn run_project(root: &Path, config: &AnalysisConfig, token: &CancellationToken) -> Result<AnalysisRun> {
    config.validate()?;

    let files = {
        let _span = debug_span!("discover", root = %root.display()).entered();
        FileWalker::from_config(root.to_path_buf(), &config.files)?
            .walk()?
            .into_iter()
            .map(|path| SourceFile {
                id: file_id_for(root, &path),
                text: SourceText::Disk(path),
            })
            .collect::<Vec<_>>()
    };

    run(files, config, token)
}

pub fn run_sources(
    sources: Vec<(String, String)>,
    config: &AnalysisConfig,
    token: &CancellationToken,
) -> Result<AnalysisRun> {
    config.validate()?;

    let mut files: Vec<SourceFile> = sources
        .into_iter()
        .map(|(id, content)| SourceFile {
            id,
            text: SourceText::Memory(content),
        })
        .collect();
    files.sort_by(|a, b| a.id.cmp(&b.id));
    files.dedup_by(|later, earlier| {
        if later.id == earlier.id {
            log::warn!("Duplicate source {} ignored", later.id);
        }
        later.id == earlier.id
    });

    run(files, config, token)
}

fn run(files: Vec<SourceFile>, config: &AnalysisConfig, token: &CancellationToken) -> Result<AnalysisRun> {
    let entry_points = config.entry_points.compile()?;
    let pool = parse_stage::build_pool(&config.parallel)?;

    let units = {
        let _span = debug_span!("parse", files = files.len()).entered();
        parse_stage::parse_files(&pool, &files, config.parallel.parse_timeout_micros(), token)?
    };

    let (mut issues, statuses) = file_local_results(&units, config);

    if token.is_cancelled() {
        log::warn!("Analysis cancelled; returning partial report");
        return Ok(AnalysisRun {
            report: AnalysisReport::new(issues, statuses, true),
            context: None,
        });
    }

    let context = {
        let mut builder = GraphBuilder::new();
        builder.add_units(units);
        builder.build()?
    };

    issues.extend(pool.install(|| run_detectors(&context, config, &entry_points)));

    let report = {
        let _span = debug_span!("aggregate", issues = issues.len()).entered();
        AnalysisReport::new(issues, statuses, false)
    };
    log::info!(
        "Analysed {} files: {} issues",
        report.summary.files_analyzed,
        report.summary.total_issues
    );

    Ok(AnalysisRun {
        report,
        context: Some(context),
    })
}

/// Statuses for every unit plus the findings that need no graph: metric
/// thresholds and antipatterns
fn file_local_results(units: &[SourceUnit], config: &AnalysisConfig) -> (Vec<Issue>, Vec<FileStatus>) {
    let mut issues = Vec::new();
    let statuses = units
        .iter()
        .map(|unit| {
            let metrics = unit.is_parsed().then(|| FileMetrics::from_unit(unit));
            issues.extend(metric_findings(unit, &config.thresholds));
            if config.detectors.antipatterns {
                issues.extend(antipattern_findings(unit));
            }
            FileStatus {
                file: unit.path.clone(),
                language: unit.language,
                status: unit.status.clone(),
                metrics,
            }
        })
        .collect();
    (issues, statuses)
}
