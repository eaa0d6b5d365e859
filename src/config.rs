//! User-defined metric generators loaded from `generators.toml`.
//!
//! ```toml
//! [[generator]]
//! key = "macro_recall"
//! name = "Recall (macro)"
//! output = "predictions"
//! source = """
//! def metric_generator(y_true, y_preds):
//!     return recall(y_true, y_preds, "macro")
//! """
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::generator::{GeneratorDefinition, OutputKind};

pub const GENERATORS_FILE_NAME: &str = "generators.toml";

/// Errors that may occur while loading generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to resolve the application directory.
    #[error(transparent)]
    AppDir(#[from] app_dirs::AppDirError),
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// A generator key is declared twice or shadows a preset.
    #[error("Metric generator key `{key}` is already registered")]
    DuplicateKey {
        /// Offending key.
        key: String,
    },
}

/// Contents of `generators.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorsConfig {
    #[serde(default, rename = "generator")]
    pub generators: Vec<UserGenerator>,
}

/// One `[[generator]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGenerator {
    pub key: String,
    pub name: String,
    pub output: OutputKind,
    pub source: String,
}

impl UserGenerator {
    pub fn definition(&self) -> GeneratorDefinition {
        GeneratorDefinition::new(self.name.clone(), self.source.clone(), self.output)
    }
}

impl GeneratorsConfig {
    /// Parse TOML text; `path` is only used for error messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        tracing::info!(
            "Loaded {} metric generator(s) from {}",
            config.generators.len(),
            path.display()
        );
        Ok(config)
    }

    /// Load `generators.toml` from the app directory, or an empty config when it is absent.
    pub fn load_from_app_dir() -> Result<Self, ConfigError> {
        let path = generators_path()?;
        if !path.is_file() {
            tracing::debug!("No generator config at {}", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

/// Location of `generators.toml` inside the app directory. Nothing is created on disk.
pub fn generators_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_path()?.join(GENERATORS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
[[generator]]
key = "macro_recall"
name = "Recall (macro)"
output = "predictions"
source = """
def metric_generator(y_true, y_preds):
    return recall(y_true, y_preds, "macro")
"""

[[generator]]
key = "scored_f1"
name = "F1"
output = "scores"
source = "def g(a, b):\n    c = unique(a)\n    check_shape(c, b)\n    return f1(a, project(c, b))\n"
"#;

    #[test]
    fn parses_generator_tables() {
        let config = GeneratorsConfig::from_toml_str(SAMPLE, Path::new("inline")).unwrap();
        assert_eq!(config.generators.len(), 2);
        assert_eq!(config.generators[0].key, "macro_recall");
        assert_eq!(config.generators[1].output, OutputKind::Scores);
        assert!(config.generators[0].source.starts_with("def metric_generator"));
    }

    #[test]
    fn empty_file_has_no_generators() {
        let config = GeneratorsConfig::from_toml_str("", Path::new("inline")).unwrap();
        assert!(config.generators.is_empty());
    }

    #[test]
    fn unknown_output_kind_is_a_parse_error() {
        let text = "[[generator]]\nkey = \"k\"\nname = \"n\"\noutput = \"logits\"\nsource = \"\"\n";
        let err = GeneratorsConfig::from_toml_str(text, Path::new("g.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().starts_with("Invalid config at g.toml"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(GENERATORS_FILE_NAME);
        std::fs::write(&path, SAMPLE).unwrap();
        let config = GeneratorsConfig::load(&path).unwrap();
        assert_eq!(config.generators[1].key, "scored_f1");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = GeneratorsConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
