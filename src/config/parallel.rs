//! Parallelism configuration for the parse phase.

use serde::{Deserialize, Serialize};

fn default_parse_timeout_ms() -> u64 {
    5_000
}

/// Controls the run-local worker pool used to parse files.
///
/// # Example
///
/// ```rust
/// use depsight::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     max_concurrency: Some(4),
///     parse_timeout_ms: 2_000,
/// };
/// assert_eq!(config.worker_count(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Worker threads (default: available parallelism)
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Per-file parse budget in milliseconds. A file exceeding it is
    /// recorded as timed out and left out of both graphs.
    #[serde(default = "default_parse_timeout_ms")]
    pub parse_timeout_ms: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            parse_timeout_ms: default_parse_timeout_ms(),
        }
    }
}

impl ParallelConfig {
    /// Single worker, useful for debugging
    pub fn sequential() -> Self {
        Self {
            max_concurrency: Some(1),
            ..Self::default()
        }
    }

    pub fn worker_count(&self) -> usize {
        match self.max_concurrency {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }

    pub fn parse_timeout_micros(&self) -> u64 {
        self.parse_timeout_ms.saturating_mul(1_000)
    }
}
