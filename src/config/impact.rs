use serde::{Deserialize, Serialize};

/// Weights of the impact score:
///
/// `score = upstream·|Upstream| + downstream·|Downstream| + complexity·complexity`
///
/// The defaults (1.5, 0.75, 1.0) weigh transitive callers twice as heavily as
/// transitive callees: a change propagates to everything that calls the
/// function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ImpactWeights {
    pub upstream: f64,
    pub downstream: f64,
    pub complexity: f64,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            upstream: default_upstream_weight(),
            downstream: default_downstream_weight(),
            complexity: default_complexity_weight(),
        }
    }
}

impl ImpactWeights {
    pub fn score(&self, upstream: usize, downstream: usize, complexity: u32) -> f64 {
        self.upstream * upstream as f64
            + self.downstream * downstream as f64
            + self.complexity * f64::from(complexity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactConfig {
    #[serde(default = "default_upstream_weight")]
    pub upstream_weight: f64,

    #[serde(default = "default_downstream_weight")]
    pub downstream_weight: f64,

    #[serde(default = "default_complexity_weight")]
    pub complexity_weight: f64,

    /// BFS depth bound; unbounded when absent
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Any function scoring at least this is reported by the project-wide
    /// scan; `detectors.impact_scan = false` turns the scan off.
    #[serde(default = "default_report_threshold")]
    pub report_threshold: f64,

    /// Functions (qualified or local names) that always get an impact finding
    #[serde(default)]
    pub targets: Vec<String>,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            upstream_weight: default_upstream_weight(),
            downstream_weight: default_downstream_weight(),
            complexity_weight: default_complexity_weight(),
            max_depth: None,
            report_threshold: default_report_threshold(),
            targets: Vec::new(),
        }
    }
}

impl ImpactConfig {
    pub fn weights(&self) -> ImpactWeights {
        ImpactWeights {
            upstream: self.upstream_weight,
            downstream: self.downstream_weight,
            complexity: self.complexity_weight,
        }
    }
}

fn default_upstream_weight() -> f64 {
    1.5
}

fn default_downstream_weight() -> f64 {
    0.75
}

fn default_complexity_weight() -> f64 {
    1.0
}

fn default_report_threshold() -> f64 {
    25.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_score() {
        let weights = ImpactWeights::default();
        assert_eq!(weights.score(5, 3, 4), 13.75);
    }

    #[test]
    fn test_weights_follow_config() {
        let config = ImpactConfig {
            upstream_weight: 2.0,
            downstream_weight: 0.0,
            complexity_weight: 0.5,
            ..ImpactConfig::default()
        };
        assert_eq!(config.weights().score(3, 100, 4), 8.0);
    }
}
