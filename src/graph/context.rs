//! Per-run analysis context: the two finalized graphs plus the registry of
//! every known function. Detectors and collaborators only ever read it.

use super::{CallGraph, FileDependencyGraph};
use crate::core::{qualified_name, AnalysisError, FunctionDef, Import, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// All functions of one run, keyed by qualified name
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, FunctionDef>,
    by_local: HashMap<String, Vec<String>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, function: FunctionDef) -> Result<()> {
        if self.functions.contains_key(&function.qualified_name) {
            return Err(AnalysisError::invariant(format!(
                "function '{}' registered twice",
                function.qualified_name
            )));
        }
        self.by_local
            .entry(function.name.clone())
            .or_default()
            .push(function.qualified_name.clone());
        self.functions
            .insert(function.qualified_name.clone(), function);
        Ok(())
    }

    pub fn get(&self, qualified_name: &str) -> Option<&FunctionDef> {
        self.functions.get(qualified_name)
    }

    /// Functions sorted by qualified name
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn by_local_name(&self, local: &str) -> &[String] {
        self.by_local.get(local).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `local` in `file`, or the constructor when `local` names a class
    pub fn local(&self, file: &str, local: &str) -> Option<String> {
        [
            qualified_name(file, local),
            qualified_name(file, &format!("{local}.__init__")),
        ]
        .into_iter()
        .find(|q| self.functions.contains_key(q))
    }

    /// Resolve a user-supplied function name: an exact qualified name, or a
    /// local name (`f`, `Class.method`) that exists in exactly one file
    pub fn lookup(&self, name: &str) -> Result<&FunctionDef> {
        if let Some(function) = self.functions.get(name) {
            return Ok(function);
        }
        match self.by_local_name(name) {
            [only] => self
                .functions
                .get(only)
                .ok_or_else(|| AnalysisError::UnknownFunction(name.to_string())),
            [] => Err(AnalysisError::UnknownFunction(name.to_string())),
            many => Err(AnalysisError::UnknownFunction(format!(
                "{name} is ambiguous ({} candidates: {})",
                many.len(),
                many.join(", ")
            ))),
        }
    }
}

/// Import-level facts the detectors need once the source units are gone
#[derive(Debug, Clone, Default)]
pub struct ModuleInfo {
    /// Imports with `resolved` filled in, plus discovered submodule imports
    pub imports: Vec<Import>,
    pub referenced_names: BTreeSet<String>,
    pub exported_names: BTreeSet<String>,
    pub is_package_init: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub(crate) file_graph: FileDependencyGraph,
    pub(crate) call_graph: CallGraph,
    pub(crate) registry: FunctionRegistry,
    pub(crate) modules: BTreeMap<String, ModuleInfo>,
    pub(crate) module_roots: BTreeSet<String>,
}

impl AnalysisContext {
    pub fn file_graph(&self) -> &FileDependencyGraph {
        &self.file_graph
    }

    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn function(&self, qualified_name: &str) -> Option<&FunctionDef> {
        self.registry.get(qualified_name)
    }

    pub fn modules(&self) -> &BTreeMap<String, ModuleInfo> {
        &self.modules
    }

    /// Functions called from module level in some file
    pub fn module_roots(&self) -> &BTreeSet<String> {
        &self.module_roots
    }

    /// Files `file` imports
    pub fn dependencies(&self, file: &str) -> Vec<String> {
        self.file_graph
            .dependencies(file)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Files importing `file`
    pub fn dependents(&self, file: &str) -> Vec<String> {
        self.file_graph
            .dependents(file)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Files whose code may break when `function` changes: the files of its
    /// transitive callers plus the files importing its own file
    pub fn affected_files(&self, function: &str) -> Result<BTreeSet<String>> {
        self.affected_files_within(function, None)
    }

    pub fn affected_files_within(
        &self,
        function: &str,
        max_depth: Option<usize>,
    ) -> Result<BTreeSet<String>> {
        let target = self.registry.lookup(function)?;
        let mut files: BTreeSet<String> = self
            .call_graph
            .upstream(&target.qualified_name, max_depth)
            .iter()
            .filter_map(|q| self.registry.get(q))
            .map(|f| f.file.clone())
            .collect();
        files.extend(self.dependents(&target.file));
        Ok(files)
    }
}
