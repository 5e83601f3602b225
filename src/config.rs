//! Configuration management for the web file manager
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! `FILE_MANAGER_*` environment variables. Everything is read once at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default upload cap: 10 GiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024 * 1024;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// HTTP port
    pub port: u16,

    /// Directory exposed to users; created if missing
    pub server_root: String,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: u64,

    /// Session lifetime in seconds, 0 for "until logout or restart"
    pub session_ttl_secs: u64,

    /// Mark the session cookie `Secure` (serve behind TLS)
    pub secure_cookies: bool,

    /// Username → password
    #[serde(default)]
    pub users: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            server_root: "./server_root".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_ttl_secs: 0,
            secure_cookies: false,
            users: HashMap::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        // Packaged layout first, then the working directory
        let config_paths = ["web-file-manager/config", "config"];

        let defaults = ServerConfig::default();
        let mut builder = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("server_root", defaults.server_root)?
            .set_default("max_upload_bytes", defaults.max_upload_bytes)?
            .set_default("session_ttl_secs", defaults.session_ttl_secs)?
            .set_default("secure_cookies", defaults.secure_cookies)?;

        for config_path in config_paths {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("FILE_MANAGER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.server_root.trim().is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Message(
                "max_upload_bytes must be greater than 0".into(),
            ));
        }

        if self.users.is_empty() {
            return Err(ConfigError::Message(
                "at least one user must be configured under [users]".into(),
            ));
        }

        if self.users.keys().any(|u| u.trim().is_empty()) {
            return Err(ConfigError::Message("usernames cannot be empty".into()));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get server root as PathBuf
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    /// Session lifetime, `None` when sessions never expire
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }
}
