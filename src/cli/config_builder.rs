//! Command-line flags layered over the file configuration.

use crate::config::AnalysisConfig;

/// Flag values that replace or extend the loaded [`AnalysisConfig`].
///
/// Entry points and impact targets extend the configured lists; every other
/// field replaces the configured value when set.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub jobs: Option<usize>,
    pub entry_points: Vec<String>,
    pub entry_patterns: Vec<String>,
    pub impact_targets: Vec<String>,
    pub max_depth: Option<usize>,
    pub threshold_complexity: Option<u32>,
    pub min_type_coverage: Option<f64>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(jobs) = self.jobs {
            config.parallel.max_concurrency = Some(jobs);
        }
        if let Some(depth) = self.max_depth {
            config.impact.max_depth = Some(depth);
        }
        if let Some(complexity) = self.threshold_complexity {
            config.thresholds.complexity = complexity;
        }
        if let Some(coverage) = self.min_type_coverage {
            config.thresholds.min_type_coverage = coverage;
        }

        config.entry_points = config
            .entry_points
            .with_names(self.entry_points)
            .with_patterns(self.entry_patterns);
        config.impact.targets.extend(self.impact_targets);
        config
    }
}
