//! Configuration management for blob-explorer
//!
//! Built-in defaults, then an optional `config.toml`, then environment
//! variables prefixed `BLOB_EXPLORER` (nested keys separated by `__`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_VAR: &str = "BLOB_EXPLORER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config";

/// Complete explorer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ExplorerConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub shell: ShellConfig,
}

/// Broker HTTP server settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the broker binds to
    pub bind_address: String,

    pub port: u16,

    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,

    /// Largest accepted upload body, in MB
    pub max_upload_mb: u64,
}

/// Object store settings
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Service endpoint; `{account}` is replaced by the account name
    pub endpoint_template: String,

    /// Chunk size for block uploads, in KB
    pub block_size_kb: usize,

    pub request_timeout_secs: u64,

    /// Name of the zero-byte object that makes an empty directory visible
    pub directory_marker: String,
}

/// Interactive shell settings
#[derive(Debug, Deserialize, Clone)]
pub struct ShellConfig {
    /// Base URL of the broker API, including the `/api` prefix
    pub api_base_url: String,
}

impl ExplorerConfig {
    /// Load configuration from defaults, `config.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(&path)
    }

    /// Load configuration using `path` as the (optional) config file
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("BLOB_EXPLORER")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: ExplorerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default(
                "server.allowed_origins",
                vec![
                    "http://localhost:5173",
                    "http://127.0.0.1:5173",
                    "http://localhost:8000",
                    "http://127.0.0.1:8000",
                ],
            )?
            .set_default("server.max_upload_mb", 256)?
            .set_default(
                "storage.endpoint_template",
                "https://{account}.blob.core.windows.net",
            )?
            .set_default("storage.block_size_kb", 4096)?
            .set_default("storage.request_timeout_secs", 30)?
            .set_default("storage.directory_marker", ".keep")?
            .set_default("shell.api_base_url", "http://127.0.0.1:8000/api")
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.server.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.server.max_upload_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_mb must be greater than 0".into(),
            ));
        }

        if !self.storage.endpoint_template.contains("{account}") {
            return Err(config::ConfigError::Message(
                "endpoint_template must contain {account}".into(),
            ));
        }

        if self.storage.block_size_kb == 0 {
            return Err(config::ConfigError::Message(
                "block_size_kb must be greater than 0".into(),
            ));
        }

        if self.storage.request_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        let marker = &self.storage.directory_marker;
        if marker.is_empty() || marker.contains('/') {
            return Err(config::ConfigError::Message(
                "directory_marker must be a single non-empty name".into(),
            ));
        }

        Ok(())
    }
}

impl ServerConfig {
    /// Get bind address and port as socket address
    pub fn socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize) * 1024 * 1024
    }
}

impl StorageConfig {
    /// Service endpoint for `account`, without a trailing slash
    pub fn endpoint_for(&self, account: &str) -> String {
        self.endpoint_template
            .replace("{account}", account)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn block_size_bytes(&self) -> usize {
        self.block_size_kb * 1024
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint_template: "https://{account}.blob.core.windows.net".into(),
            block_size_kb: 4096,
            request_timeout_secs: 30,
            directory_marker: ".keep".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_file() {
        let config = ExplorerConfig::load_from("does-not-exist/config").unwrap();
        assert_eq!(config.server.socket(), "127.0.0.1:8000");
        assert_eq!(config.server.allowed_origins.len(), 4);
        assert_eq!(config.storage.directory_marker, ".keep");
        assert_eq!(config.storage.block_size_bytes(), 4096 * 1024);
        assert_eq!(config.shell.api_base_url, "http://127.0.0.1:8000/api");
    }

    #[test]
    fn test_endpoint_for_account() {
        let storage = StorageConfig {
            endpoint_template: "http://127.0.0.1:10000/{account}/".into(),
            ..StorageConfig::default()
        };
        assert_eq!(
            storage.endpoint_for("devstoreaccount1"),
            "http://127.0.0.1:10000/devstoreaccount1"
        );
    }
}
