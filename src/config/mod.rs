//! Configuration loading and management.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Report processing configuration.
    pub report: ReportConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Report processing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Aggregate coverage for every file in the report instead of scoping
    /// to one target file. CLI `--by-file` overrides this.
    pub by_file: bool,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format: "text", "json" or "markdown".
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config`
    /// flags. Env vars with `LINECOV_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::core::Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("LINECOV_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from a directory, looking for linecov.toml or
    /// .linecov/linecov.toml.
    ///
    /// Missing files are silently skipped (defaults are used). Env vars with
    /// `LINECOV_` prefix override file/default values.
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("linecov.toml")))
            .merge(Toml::file(dir.join(".linecov/linecov.toml")))
            .merge(Env::prefixed("LINECOV_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.report.by_file);
        assert_eq!(config.output.format, "text");
    }

    #[test]
    fn test_from_file_missing_path_errors() {
        let result = Config::from_file("/nonexistent/linecov.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_default_without_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config::load_default(dir.path()).expect("load");
        assert!(!config.report.by_file);
    }

    #[test]
    fn test_load_default_reads_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("linecov.toml"),
            "[report]\nby_file = true\n\n[output]\nformat = \"json\"\n",
        )
        .expect("write config");

        let config = Config::load_default(dir.path()).expect("load");
        assert!(config.report.by_file);
        assert_eq!(config.output.format, "json");
    }
}
