use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{validation::validate_config, AnalysisConfig};
use crate::core::{AnalysisError, Result};

pub const CONFIG_FILE_NAME: &str = ".depsight.toml";

pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML document and validate the result
pub fn parse_and_validate_config(contents: &str) -> Result<AnalysisConfig> {
    let config = toml::from_str::<AnalysisConfig>(contents).map_err(|e| {
        AnalysisError::configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}"))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Load an explicitly named config file. A missing file is an error here.
pub fn load_config_from_path(path: &Path) -> Result<AnalysisConfig> {
    let contents = read_config_file(path)
        .map_err(|e| AnalysisError::file_system(path, format!("cannot read config: {e}")))?;
    let config = parse_and_validate_config(&contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load `.depsight.toml` from the analysed root, falling back to defaults
/// when the root has none
pub fn load_config(root: &Path) -> Result<AnalysisConfig> {
    let path = root.join(CONFIG_FILE_NAME);
    match read_config_file(&path) {
        Ok(contents) => {
            let config = parse_and_validate_config(&contents)?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", root.display());
            Ok(AnalysisConfig::default())
        }
        Err(e) => Err(AnalysisError::file_system(
            path,
            format!("cannot read config: {e}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = parse_and_validate_config(indoc! {r#"
            [thresholds]
            complexity = 15

            [entry_points]
            names = ["cli.main"]
        "#})
        .unwrap();

        assert_eq!(config.thresholds.complexity, 15);
        assert_eq!(config.thresholds.min_type_coverage, 0.5);
        assert_eq!(config.entry_points.names, vec!["cli.main"]);
        assert_eq!(config.entry_points.patterns, vec!["test_*", "__*__"]);
        assert_eq!(config.impact.upstream_weight, 1.5);
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let err = parse_and_validate_config("[thresholds\ncomplexity = ").unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
    }

    #[test]
    fn test_invalid_values_rejected_after_parse() {
        let err = parse_and_validate_config(indoc! {r#"
            [impact]
            upstream_weight = -1.0
        "#})
        .unwrap_err();
        assert!(err.to_string().contains("impact.upstream_weight"));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_load_config_reads_root_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[parallel]\nmax_concurrency = 2\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.parallel.max_concurrency, Some(2));
    }

    #[test]
    fn test_load_config_from_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_config_from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, AnalysisError::FileSystem { .. }));
    }
}
