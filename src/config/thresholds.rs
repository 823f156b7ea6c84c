use serde::{Deserialize, Serialize};

/// Metric thresholds that turn measurements into findings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdsConfig {
    /// Functions with cyclomatic complexity above this are reported
    #[serde(default = "default_complexity")]
    pub complexity: u32,

    /// Files whose type-hint coverage (0.0-1.0) falls below this are reported
    #[serde(default = "default_min_type_coverage")]
    pub min_type_coverage: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            complexity: default_complexity(),
            min_type_coverage: default_min_type_coverage(),
        }
    }
}

fn default_complexity() -> u32 {
    10
}

fn default_min_type_coverage() -> f64 {
    0.5
}
