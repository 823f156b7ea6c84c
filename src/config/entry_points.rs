//! Entry-point specification for dead-code reachability.
//!
//! The set of externally invoked functions is always supplied by the caller;
//! the matcher only applies it to the functions the parser found.

use crate::core::{AnalysisError, FunctionDef, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryPointSpec {
    /// Qualified (`pkg/app.py::main`) or local (`main`, `Cli.run`) names
    #[serde(default = "default_names")]
    pub names: Vec<String>,

    /// Globs matched against a function's simple name, e.g. `test_*`
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,

    /// Treat functions called at module level as entry points
    #[serde(default = "default_module_level")]
    pub module_level: bool,
}

impl Default for EntryPointSpec {
    fn default() -> Self {
        Self {
            names: default_names(),
            patterns: default_patterns(),
            module_level: default_module_level(),
        }
    }
}

impl EntryPointSpec {
    /// No entry points at all; every function must be reached from a name
    /// added later
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            patterns: Vec::new(),
            module_level: false,
        }
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn compile(&self) -> Result<EntryPointMatcher> {
        if let Some(blank) = self.names.iter().position(|n| n.trim().is_empty()) {
            return Err(AnalysisError::configuration(format!(
                "entry_points.names[{blank}]: empty name"
            )));
        }

        let patterns = self
            .patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    AnalysisError::configuration(format!(
                        "entry_points.patterns: invalid glob '{p}': {e}"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EntryPointMatcher {
            names: self.names.iter().cloned().collect(),
            patterns,
            module_level: self.module_level,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EntryPointMatcher {
    names: HashSet<String>,
    patterns: Vec<glob::Pattern>,
    module_level: bool,
}

impl EntryPointMatcher {
    pub fn matches(&self, function: &FunctionDef) -> bool {
        self.names.contains(&function.qualified_name)
            || self.names.contains(&function.name)
            || self
                .patterns
                .iter()
                .any(|p| p.matches(function.simple_name()))
    }

    pub fn includes_module_level(&self) -> bool {
        self.module_level
    }
}

fn default_names() -> Vec<String> {
    vec!["main".to_string()]
}

fn default_patterns() -> Vec<String> {
    vec!["test_*".to_string(), "__*__".to_string()]
}

fn default_module_level() -> bool {
    true
}
