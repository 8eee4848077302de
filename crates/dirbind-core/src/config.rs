//! Configuration for Dirbind
//!
//! Loaded from a TOML file or from `DIRBIND_*` environment variables:
//!
//! ```toml
//! [directory]
//! host = "ldap.example.com"
//! port = 389
//! root_dn = "cn=admin,dc=example,dc=com"
//! root_password = "secret"
//! base_dn = "dc=example,dc=com"
//! timeout_seconds = 10
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;

use crate::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirbindConfig {
    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DirbindConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::InvalidArgument(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| crate::Error::InvalidArgument(format!("Failed to parse config: {}", e)))
    }

    /// Defaults overlaid with the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay any `DIRBIND_*` variables present in the environment.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("DIRBIND_HOST") {
            self.directory.host = host;
        }
        if let Ok(port) = std::env::var("DIRBIND_PORT") {
            if let Ok(p) = port.parse() {
                self.directory.port = p;
            }
        }
        if let Ok(dn) = std::env::var("DIRBIND_ROOT_DN") {
            self.directory.root_dn = dn;
        }
        if let Ok(password) = std::env::var("DIRBIND_ROOT_PASSWORD") {
            self.directory.root_password = SecretString::from(password);
        }
        if let Ok(dn) = std::env::var("DIRBIND_BASE_DN") {
            self.directory.base_dn = dn;
        }
        if let Ok(timeout) = std::env::var("DIRBIND_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.directory.timeout_seconds = t;
            }
        }
        if let Ok(level) = std::env::var("DIRBIND_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

/// Directory server and privileged search account
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Server hostname or IP literal
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// DN of the account used to search for users
    #[serde(default)]
    pub root_dn: String,

    /// Never serialized or printed
    #[serde(default = "empty_secret")]
    pub root_password: SecretString,

    /// Subtree searched for logins
    /// Example: "dc=example,dc=com"
    #[serde(default)]
    pub base_dn: String,

    /// Connect and per-operation timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_port(),
            root_dn: String::new(),
            root_password: empty_secret(),
            base_dn: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl DirectoryConfig {
    /// Check that every required setting is present.
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::InvalidArgument(
                "directory host is required".into(),
            ));
        }
        if self.port == 0 {
            return Err(crate::Error::InvalidArgument(
                "directory port must be in 1-65535".into(),
            ));
        }
        if self.root_dn.is_empty() {
            return Err(crate::Error::InvalidArgument("root DN is required".into()));
        }
        if self.root_password.expose_secret().is_empty() {
            return Err(crate::Error::InvalidArgument(
                "root password is required".into(),
            ));
        }
        if self.base_dn.is_empty() {
            return Err(crate::Error::InvalidArgument("base DN is required".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(crate::Error::InvalidArgument(
                "timeout_seconds must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
