//! Configuration management for mongowire

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Main configuration structure for the protocol layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Command library configuration
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Reply envelope configuration
    #[serde(default)]
    pub reply: ReplyConfig,
}

impl ProtocolConfig {
    /// Load configuration from a TOML/JSON file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| ConfigError::Read {
                path: path.as_ref().display().to_string(),
                source: e,
            })?;

        let config = if path.as_ref().extension().map_or(false, |ext| ext == "toml") {
            Self::from_toml_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Command tokens left out of the standard library (case-insensitive)
    pub disabled: Vec<String>,
}

impl CommandsConfig {
    pub fn is_disabled(&self, token: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(token))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Maximum number of documents rendered when a reply is printed
    pub diagnostic_documents_limit: usize,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            diagnostic_documents_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProtocolConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.commands.disabled.is_empty());
        assert_eq!(config.reply.diagnostic_documents_limit, 10);
    }

    #[test]
    fn test_partial_toml() {
        let config = ProtocolConfig::from_toml_str(
            r#"
            [commands]
            disabled = ["replSetFresh"]

            [reply]
            diagnostic_documents_limit = 3
            "#,
        )
        .unwrap();

        assert!(config.commands.is_disabled("REPLSETFRESH"));
        assert!(!config.commands.is_disabled("ping"));
        assert_eq!(config.reply.diagnostic_documents_limit, 3);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = ProtocolConfig::from_toml_str("[reply]\ndiagnostic_documents_limit = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[tokio::test]
    async fn test_load_from_files() {
        let dir = tempfile::TempDir::new().unwrap();

        let toml_path = dir.path().join("mongowire.toml");
        tokio::fs::write(&toml_path, "[logging]\nlevel = \"debug\"\njson = true\n")
            .await
            .unwrap();
        let config = ProtocolConfig::load(&toml_path).await.unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        let json_path = dir.path().join("mongowire.json");
        tokio::fs::write(&json_path, r#"{"commands": {"disabled": ["ping"]}}"#)
            .await
            .unwrap();
        let config = ProtocolConfig::load(&json_path).await.unwrap();
        assert_eq!(config.commands.disabled, vec!["ping".to_string()]);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ProtocolConfig::load("/nonexistent/mongowire.toml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
