use crate::core::{Language, ParseStatus, Result, SourceUnit};

pub mod python;

/// Turns the text of one file into a [`SourceUnit`].
///
/// Structural problems in the analysed file (syntax errors, timeouts) are
/// reported on the unit's status. `Err` is reserved for failures of the
/// analyzer itself, such as a grammar that cannot be loaded.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, content: &str, file_id: &str) -> Result<SourceUnit>;
    fn language(&self) -> Language;
}

pub fn get_analyzer(language: Language, timeout_micros: u64) -> Box<dyn Analyzer> {
    match language {
        Language::Python => Box::new(python::PythonAnalyzer::with_timeout_micros(timeout_micros)),
        Language::Unknown => Box::new(NullAnalyzer),
    }
}

/// Parse one in-memory file, picking the analyzer from its extension
pub fn analyze_source(content: &str, file_id: &str, timeout_micros: u64) -> Result<SourceUnit> {
    get_analyzer(Language::from_path(file_id), timeout_micros).analyze(content, file_id)
}

struct NullAnalyzer;

impl Analyzer for NullAnalyzer {
    fn analyze(&self, _content: &str, file_id: &str) -> Result<SourceUnit> {
        Ok(SourceUnit::failed(
            file_id,
            Language::Unknown,
            ParseStatus::parse_error("unsupported language"),
        ))
    }

    fn language(&self) -> Language {
        Language::Unknown
    }
}
