mod entry_points;
mod impact;
pub mod loader;
mod parallel;
mod thresholds;
pub mod validation;

pub use entry_points::{EntryPointMatcher, EntryPointSpec};
pub use impact::{ImpactConfig, ImpactWeights};
pub use loader::{load_config, load_config_from_path, parse_and_validate_config, CONFIG_FILE_NAME};
pub use parallel::ParallelConfig;
pub use thresholds::ThresholdsConfig;
pub use validation::validate_config;

use serde::{Deserialize, Serialize};

/// Directories never descended into, regardless of include patterns
pub const DEFAULT_SKIP_DIRS: &[&str] = &["__pycache__", ".venv", "venv", "env", ".git"];

/// Complete configuration of one analysis run, as read from `.depsight.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    #[serde(default)]
    pub impact: ImpactConfig,

    #[serde(default)]
    pub entry_points: EntryPointSpec,

    #[serde(default)]
    pub parallel: ParallelConfig,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub detectors: DetectorsConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> crate::core::Result<()> {
        validate_config(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilesConfig {
    /// Globs over root-relative paths; a file must match one
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Globs over root-relative paths; matching files are skipped
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: Vec::new(),
        }
    }
}

fn default_include() -> Vec<String> {
    vec!["**/*.py".to_string()]
}

/// Switches for the optional detectors. Cycles and dead code always run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectorsConfig {
    #[serde(default = "enabled")]
    pub unused_imports: bool,

    /// Score every function and report those above `impact.report_threshold`
    #[serde(default = "enabled")]
    pub impact_scan: bool,

    /// eval/exec, bare except, deeply nested loops, mutable defaults
    #[serde(default = "enabled")]
    pub antipatterns: bool,
}

impl Default for DetectorsConfig {
    fn default() -> Self {
        Self {
            unused_imports: true,
            impact_scan: true,
            antipatterns: true,
        }
    }
}

fn enabled() -> bool {
    true
}
