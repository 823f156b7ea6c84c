//! Detectors.
//!
//! The graph-derived ones read the finalized [`AnalysisContext`] only, so
//! they run concurrently under `rayon::join`. Antipattern findings need a
//! single parsed file and are produced alongside the metric findings.

pub mod antipatterns;
pub mod cycles;
pub mod dead_code;
pub mod impact;
pub mod unused_imports;

pub use antipatterns::antipattern_findings;
pub use cycles::{cycle_findings, detect_cycles};
pub use dead_code::{collect_entry_points, dead_code_findings, find_dead_functions};
pub use impact::{impact_findings, ImpactAnalysis, ImpactAnalyzer};
pub use unused_imports::unused_import_findings;

use crate::config::{AnalysisConfig, EntryPointMatcher};
use crate::core::Issue;
use crate::graph::AnalysisContext;
use tracing::debug_span;

pub fn run_detectors(
    ctx: &AnalysisContext,
    config: &AnalysisConfig,
    entry_points: &EntryPointMatcher,
) -> Vec<Issue> {
    let _span = debug_span!("detectors").entered();

    let ((cycles, dead), (impact, unused)) = rayon::join(
        || {
            rayon::join(
                || cycle_findings(ctx.file_graph()),
                || dead_code_findings(ctx, entry_points),
            )
        },
        || {
            rayon::join(
                || impact_findings(ctx, &config.impact, config.detectors.impact_scan),
                || {
                    if config.detectors.unused_imports {
                        unused_import_findings(ctx)
                    } else {
                        Vec::new()
                    }
                },
            )
        },
    );

    log::debug!(
        "Detectors: {} cycle, {} dead code, {} impact, {} unused import findings",
        cycles.len(),
        dead.len(),
        impact.len(),
        unused.len()
    );

    let mut issues = cycles;
    issues.extend(dead);
    issues.extend(impact);
    issues.extend(unused);
    issues
}
