use crate::config::{FilesConfig, DEFAULT_SKIP_DIRS};
use crate::core::{file_id_for, AnalysisError, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Selects the files of one run: every file under `root` whose root-relative
/// id matches an include glob and no exclude glob, honouring `.gitignore`
/// and never entering the skip directories.
pub struct FileWalker {
    root: PathBuf,
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
    skip_dirs: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            include: glob::Pattern::new("**/*.py").into_iter().collect(),
            exclude: Vec::new(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn from_config(root: PathBuf, files: &FilesConfig) -> Result<Self> {
        Self::new(root)
            .with_include(&files.include)?
            .with_exclude(&files.exclude)
    }

    pub fn with_include(mut self, patterns: &[String]) -> Result<Self> {
        self.include = compile(patterns)?;
        Ok(self)
    }

    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = compile(patterns)?;
        Ok(self)
    }

    /// Selected files, sorted by path
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(AnalysisError::file_system(
                &self.root,
                "analysis root is not a readable directory",
            ));
        }

        let skip_dirs = self.skip_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && skip_dirs.iter().any(|d| entry.file_name() == d.as_str()))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        log::debug!("Selected {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let id = file_id_for(&self.root, path);
        self.include.iter().any(|p| p.matches(&id)) && !self.exclude.iter().any(|p| p.matches(&id))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).map_err(AnalysisError::from))
        .collect()
}
