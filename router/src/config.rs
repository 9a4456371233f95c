//! Router configuration
//!
//! Loaded from a JSON file. The `store` section is handed to the core
//! store as is; the remaining fields control how requests are turned into
//! rows and how results are printed.

use chrono::format::{Item, StrftimeItems};
use serde::{Serialize, Deserialize};

use ledger_tables_core::format::DEFAULT_HISTORY_LABEL;
use ledger_tables_core::StoreConfig;
use crate::error::{Result, RouterError};

/// Pattern producing fixed-width `YYYYMMDDhhmmss` timestamps
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// How query results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bracketed history text
    #[default]
    Text,
    /// Structured JSON rows
    Json,
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Core store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// chrono format for the timestamp key column
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Output format for query results
    #[serde(default)]
    pub output: OutputFormat,

    /// Label written before text results
    #[serde(default = "default_history_label")]
    pub history_label: String,
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_history_label() -> String {
    DEFAULT_HISTORY_LABEL.to_string()
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            store: StoreConfig::default(),
            timestamp_format: default_timestamp_format(),
            output: OutputFormat::default(),
            history_label: default_history_label(),
        }
    }
}

impl RouterConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: RouterConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Check settings that cannot be expressed in the type
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;

        if self.timestamp_format.is_empty() {
            return Err(RouterError::Config("timestamp_format must not be empty".to_string()));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(RouterError::Config(format!(
                "invalid timestamp_format {:?}",
                self.timestamp_format
            )));
        }
        Ok(())
    }

    /// Create a testing configuration
    pub fn testing() -> Self {
        RouterConfig {
            store: StoreConfig::testing(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();

        assert_eq!(config.timestamp_format, "%Y%m%d%H%M%S");
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.history_label, "Inventory history");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_io() {
        let mut config = RouterConfig::testing();
        config.output = OutputFormat::Json;
        config.history_label = "Price history".to_string();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        config.to_file(path).unwrap();
        let loaded = RouterConfig::from_file(path).unwrap();

        assert_eq!(loaded.output, OutputFormat::Json);
        assert_eq!(loaded.history_label, "Price history");
        assert_eq!(loaded.store.log_level, "warn");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: RouterConfig = serde_json::from_str(r#"{"output": "json"}"#).unwrap();

        assert_eq!(loaded.output, OutputFormat::Json);
        assert_eq!(loaded.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(loaded.store.log_level, "info");
    }

    #[rstest]
    #[case("", false)]
    #[case("%Y-%m-%d", true)]
    #[case("%Y%m%d%H%M%S", true)]
    #[case("%Q", false)]
    fn test_timestamp_format_validation(#[case] pattern: &str, #[case] valid: bool) {
        let mut config = RouterConfig::default();
        config.timestamp_format = pattern.to_string();
        assert_eq!(config.validate().is_ok(), valid);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RouterConfig::from_file("/nonexistent/ledger-tables.json"),
            Err(RouterError::Io(_))
        ));
    }
}
