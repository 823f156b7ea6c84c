//! Bounded parallel parsing: one [`SourceUnit`] per input file.

use super::cancel::CancellationToken;
use crate::analyzers::analyze_source;
use crate::config::ParallelConfig;
use crate::core::{Language, ParseStatus, Result, SourceUnit};
use crate::io::read_file;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::PathBuf;

/// Rayon thread stack size (8MB for deeply nested syntax trees)
const RAYON_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Where a file's text comes from
#[derive(Clone, Debug)]
pub enum SourceText {
    Disk(PathBuf),
    Memory(String),
}

#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Root-relative, `/`-separated file id
    pub id: String,
    pub text: SourceText,
}

/// Worker pool owned by a single run
pub fn build_pool(config: &ParallelConfig) -> Result<ThreadPool> {
    let threads = config.worker_count();
    log::debug!("Using {threads} worker threads");
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .stack_size(RAYON_STACK_SIZE)
        .thread_name(|i| format!("depsight-worker-{i}"))
        .build()?)
}

/// Parse every file on `pool`, preserving input order.
///
/// The token is checked before each file; files reached after cancellation
/// get a `Cancelled` status without being read.
pub fn parse_files(
    pool: &ThreadPool,
    files: &[SourceFile],
    timeout_micros: u64,
    token: &CancellationToken,
) -> Result<Vec<SourceUnit>> {
    pool.install(|| {
        files
            .par_iter()
            .map(|file| parse_file(file, timeout_micros, token))
            .collect()
    })
}

fn parse_file(file: &SourceFile, timeout_micros: u64, token: &CancellationToken) -> Result<SourceUnit> {
    let language = Language::from_path(&file.id);
    if token.is_cancelled() {
        return Ok(SourceUnit::failed(&file.id, language, ParseStatus::Cancelled));
    }

    let content = match &file.text {
        SourceText::Memory(content) => content.clone(),
        SourceText::Disk(path) => match read_file(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                return Ok(SourceUnit::failed(
                    &file.id,
                    language,
                    ParseStatus::parse_error(format!("unreadable: {e}")),
                ));
            }
        },
    };

    analyze_source(&content, &file.id, timeout_micros)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(id: &str, content: &str) -> SourceFile {
        SourceFile {
            id: id.to_string(),
            text: SourceText::Memory(content.to_string()),
        }
    }

    #[test]
    fn test_parse_preserves_order() {
        let pool = build_pool(&ParallelConfig::sequential()).unwrap();
        let files = vec![
            memory("b.py", "def f():\n    pass\n"),
            memory("a.py", "def g(:\n"),
            memory("c.txt", "hello"),
        ];
        let units = parse_files(&pool, &files, 0, &CancellationToken::new()).unwrap();

        let ids: Vec<_> = units.iter().map(|u| u.path.as_str()).collect();
        assert_eq!(ids, vec!["b.py", "a.py", "c.txt"]);
        assert!(units[0].is_parsed());
        assert!(matches!(units[1].status, ParseStatus::ParseError { .. }));
        assert_eq!(units[2].status, ParseStatus::parse_error("unsupported language"));
    }

    #[test]
    fn test_cancelled_token_skips_every_file() {
        let pool = build_pool(&ParallelConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let units = parse_files(&pool, &[memory("a.py", "x = 1\n")], 0, &token).unwrap();
        assert_eq!(units[0].status, ParseStatus::Cancelled);
    }

    #[test]
    fn test_unreadable_file_is_parse_error() {
        let pool = build_pool(&ParallelConfig::sequential()).unwrap();
        let file = SourceFile {
            id: "gone.py".to_string(),
            text: SourceText::Disk(PathBuf::from("/nonexistent/depsight/gone.py")),
        };
        let units = parse_files(&pool, &[file], 0, &CancellationToken::new()).unwrap();
        match &units[0].status {
            ParseStatus::ParseError { reason } => assert!(reason.starts_with("unreadable: ")),
            other => panic!("unexpected status {other:?}"),
        }
    }
}
