//! Command-line interface for depsight
//!
//! - Argument parsing (`Cli`, `Commands`, `AnalyzeArgs`)
//! - Flag overrides on top of the loaded configuration (`config_builder`)
//! - Runtime setup (`setup`)

pub mod config_builder;
pub mod setup;

pub use config_builder::ConfigOverrides;
pub use setup::init_logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "depsight")]
#[command(about = "Dependency-cycle, dead-code and change-impact analysis for Python", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a source tree and print the report as JSON
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to analyze
    pub path: PathBuf,

    /// Configuration file (defaults to <path>/.depsight.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of parser threads (defaults to available parallelism)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Additional entry-point function name (repeatable)
    #[arg(long = "entry-point")]
    pub entry_points: Vec<String>,

    /// Additional entry-point glob on simple function names (repeatable)
    #[arg(long = "entry-pattern")]
    pub entry_patterns: Vec<String>,

    /// Function to compute change impact for (repeatable)
    #[arg(long = "impact")]
    pub impact_targets: Vec<String>,

    /// Depth bound for impact traversal
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Cyclomatic complexity threshold
    #[arg(long)]
    pub threshold_complexity: Option<u32>,

    /// Minimum per-file type-hint coverage (0.0 to 1.0)
    #[arg(long)]
    pub min_type_coverage: Option<f64>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl AnalyzeArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            jobs: self.jobs,
            entry_points: self.entry_points.clone(),
            entry_patterns: self.entry_patterns.clone(),
            impact_targets: self.impact_targets.clone(),
            max_depth: self.max_depth,
            threshold_complexity: self.threshold_complexity,
            min_type_coverage: self.min_type_coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::parse_from([
            "depsight",
            "analyze",
            "src",
            "--entry-point",
            "run",
            "--entry-point",
            "serve",
            "--impact",
            "core.py::handle",
            "--max-depth",
            "2",
            "-vv",
        ]);
        let Commands::Analyze(args) = cli.command;
        assert_eq!(args.path, PathBuf::from("src"));
        assert_eq!(args.entry_points, vec!["run", "serve"]);
        assert_eq!(args.impact_targets, vec!["core.py::handle"]);
        assert_eq!(args.max_depth, Some(2));
        assert_eq!(args.verbosity, 2);
        assert!(!args.pretty);
    }
}
