//! Import and call resolution.
//!
//! Imports resolve to file ids inside the analysed root; anything else is
//! external and stays off the graph. Calls resolve through the same file,
//! then the file's import bindings, then a unique project-wide match.

use super::context::FunctionRegistry;
use crate::core::{module_name_for, Import, ImportKind};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Module lookup over the set of analysed files
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    files: BTreeSet<String>,
    by_module: BTreeMap<String, Vec<String>>,
}

impl ModuleIndex {
    pub fn new<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = Self::default();
        for file in files {
            index.files.insert(file.to_string());
            let module = module_name_for(file);
            if !module.is_empty() {
                index
                    .by_module
                    .entry(module)
                    .or_default()
                    .push(file.to_string());
            }
        }
        index
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains(file)
    }

    /// Target file of the module an import statement names
    pub fn resolve(&self, import: &Import) -> Option<String> {
        self.resolve_module(&import.source_file, &import.module, import.level)
    }

    /// For `from pkg import name`: the file of submodule `pkg.name`, if any
    pub fn resolve_submodule(&self, import: &Import, name: &str) -> Option<String> {
        if import.kind != ImportKind::From {
            return None;
        }
        let module = if import.module.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", import.module)
        };
        self.resolve_module(&import.source_file, &module, import.level)
    }

    pub fn resolve_module(&self, importer: &str, module: &str, level: usize) -> Option<String> {
        let dir = parent_dir(importer);

        if level > 0 {
            let mut base = dir.to_string();
            for _ in 1..level {
                if base.is_empty() {
                    return None;
                }
                base = parent_dir(&base).to_string();
            }
            if module.is_empty() {
                return self.existing(join(&base, "__init__.py"));
            }
            let path = join(&base, &module.replace('.', "/"));
            return self.first_existing([format!("{path}.py"), format!("{path}/__init__.py")]);
        }

        if module.is_empty() {
            return None;
        }
        let relative = module.replace('.', "/");
        let local = join(dir, &relative);
        self.first_existing([
            format!("{relative}.py"),
            format!("{relative}/__init__.py"),
            format!("{local}.py"),
            format!("{local}/__init__.py"),
        ])
        .or_else(|| self.unique_suffix_match(module))
    }

    fn existing(&self, candidate: String) -> Option<String> {
        self.files.contains(&candidate).then_some(candidate)
    }

    fn first_existing<const N: usize>(&self, candidates: [String; N]) -> Option<String> {
        candidates.into_iter().find(|c| self.files.contains(c))
    }

    /// `src/pkg/mod.py` answers `pkg.mod` when nothing else claims it
    fn unique_suffix_match(&self, module: &str) -> Option<String> {
        let suffix = format!(".{module}");
        let mut matches = self
            .by_module
            .iter()
            .filter(|(name, _)| name.as_str() == module || name.ends_with(&suffix))
            .flat_map(|(_, files)| files.iter());
        let first = matches.next()?;
        match matches.next() {
            None => Some(first.clone()),
            Some(_) => {
                log::trace!("Ambiguous module '{module}', leaving unresolved");
                None
            }
        }
    }
}

/// What a name bound by an import refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `import a.b`, `import a.b as m`, `from pkg import submodule`
    Module(String),
    /// `from m import f [as g]`
    Symbol { file: String, name: String },
}

/// Names an importing file can call through
#[derive(Debug, Clone, Default)]
pub struct ImportBindings {
    names: HashMap<String, Binding>,
    wildcards: Vec<String>,
}

impl ImportBindings {
    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.names.insert(name.into(), binding);
    }

    pub fn add_wildcard(&mut self, file: impl Into<String>) {
        self.wildcards.push(file.into());
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.names.get(name)
    }
}

pub struct CallResolver<'a> {
    registry: &'a FunctionRegistry,
    bindings: &'a HashMap<String, ImportBindings>,
}

impl<'a> CallResolver<'a> {
    pub fn new(
        registry: &'a FunctionRegistry,
        bindings: &'a HashMap<String, ImportBindings>,
    ) -> Self {
        Self { registry, bindings }
    }

    /// Qualified name of the function `reference` calls from inside `file`
    /// (and class `class_name` for methods). `None` drops the reference.
    pub fn resolve(&self, file: &str, class_name: Option<&str>, reference: &str) -> Option<String> {
        if let Some(found) = self.resolve_same_file(file, class_name, reference) {
            return Some(found);
        }

        if let Some(bindings) = self.bindings.get(file) {
            if let Some(found) = self.resolve_through_imports(bindings, reference) {
                return found;
            }
        }

        self.resolve_project_wide(file, reference)
    }

    fn resolve_same_file(
        &self,
        file: &str,
        class_name: Option<&str>,
        reference: &str,
    ) -> Option<String> {
        if let (Some(class), Some(method)) = (class_name, receiver_member(reference)) {
            return self.registry.local(file, &format!("{class}.{method}"));
        }
        self.registry.local(file, reference)
    }

    /// `Some(None)` when a binding claims the reference but the target has
    /// no such function: the reference is then dropped rather than guessed.
    fn resolve_through_imports(
        &self,
        bindings: &ImportBindings,
        reference: &str,
    ) -> Option<Option<String>> {
        let segments: Vec<&str> = reference.split('.').collect();
        for split in (1..=segments.len()).rev() {
            let prefix = segments[..split].join(".");
            let Some(binding) = bindings.get(&prefix) else {
                continue;
            };
            let rest = segments[split..].join(".");
            let resolved = match binding {
                Binding::Module(_) if rest.is_empty() => None,
                Binding::Module(target) => self.registry.local(target, &rest),
                Binding::Symbol { file, name } if rest.is_empty() => self.registry.local(file, name),
                Binding::Symbol { file, name } => {
                    self.registry.local(file, &format!("{name}.{rest}"))
                }
            };
            return Some(resolved);
        }

        bindings
            .wildcards
            .iter()
            .find_map(|target| self.registry.local(target, reference))
            .map(Some)
    }

    fn resolve_project_wide(&self, file: &str, reference: &str) -> Option<String> {
        if receiver_member(reference).is_some() {
            return None;
        }
        self.unique_elsewhere(file, reference).or_else(|| {
            // A class called by name elsewhere is an instantiation
            self.unique_elsewhere(file, &format!("{reference}.__init__"))
        })
    }

    fn unique_elsewhere(&self, file: &str, local: &str) -> Option<String> {
        let mut candidates = self
            .registry
            .by_local_name(local)
            .iter()
            .filter(|q| self.registry.get(q).is_some_and(|f| f.file != file));
        let first = candidates.next()?;
        match candidates.next() {
            None => Some(first.clone()),
            Some(_) => {
                log::trace!("Ambiguous call '{local}' from {file}, dropping");
                None
            }
        }
    }
}

/// `m` for `self.m` / `cls.m`
fn receiver_member(reference: &str) -> Option<&str> {
    let member = reference
        .strip_prefix("self.")
        .or_else(|| reference.strip_prefix("cls."))?;
    (!member.contains('.')).then_some(member)
}

fn parent_dir(file: &str) -> &str {
    file.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn join(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        relative.to_string()
    } else {
        format!("{dir}/{relative}")
    }
}
