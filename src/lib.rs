//! Structural analysis of Python source trees.
//!
//! A run parses every selected file, merges the results into a file
//! dependency graph and a function call graph, and reports dependency
//! cycles, dead functions, change impact, unused imports, antipatterns
//! (eval/exec, bare except, deep loop nesting, mutable defaults), and
//! complexity and type-coverage metrics as evidence-bearing [`Issue`]s.

// Export modules for library usage
pub mod analysis;
pub mod analyzers;
pub mod cli;
pub mod config;
pub mod core;
pub mod findings;
pub mod graph;
pub mod io;
pub mod metrics;
pub mod pipeline;

// Re-export commonly used types
pub use crate::core::{
    AnalysisError, Antipattern, AntipatternRule, Category, Evidence, FindingKind, FunctionDef, ImpactLevel, ImpactScore, Import,
    Issue, Language, Location, ParseStatus, Result, Severity, SourceUnit,
};

pub use crate::config::{load_config, load_config_from_path, AnalysisConfig, EntryPointSpec};

pub use crate::analyzers::{analyze_source, get_analyzer, Analyzer};

pub use crate::graph::{AnalysisContext, CallGraph, FileDependencyGraph, GraphBuilder};

pub use crate::analysis::{detect_cycles, ImpactAnalysis, ImpactAnalyzer};

pub use crate::findings::{AnalysisReport, FileStatus, Summary};

pub use crate::pipeline::{
    analyze_project, analyze_project_with_cancel, analyze_sources, run_project, run_sources,
    AnalysisRun, CancellationToken,
};
