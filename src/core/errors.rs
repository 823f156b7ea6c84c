//! Shared error types for the application
//!
//! Only conditions that stop a run live here. Per-file problems (syntax
//! errors, parse timeouts, unreadable files) are recorded on the file's
//! [`ParseStatus`](crate::core::ParseStatus) and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error type for depsight operations
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid entry-point spec, weights, thresholds or filters.
    /// Raised before any file is parsed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Graph construction saw a duplicate node or a dangling edge.
    /// This is always a bug, never a property of the analysed code.
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    /// An impact query named a function absent from the call graph
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The analysed root could not be walked
    #[error("File system error at {path}: {message}")]
    FileSystem { path: PathBuf, message: String },

    /// The tree-sitter grammar could not be loaded
    #[error("Parser initialisation failed: {0}")]
    Parser(String),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant(message.into())
    }

    /// Create a file system error with path context
    pub fn file_system(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileSystem {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error signals a defect in depsight itself
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalInvariant(_))
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, AnalysisError>;
