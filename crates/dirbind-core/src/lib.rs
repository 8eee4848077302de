//! Dirbind Core Library
//!
//! Error taxonomy, configuration and shared constants for directory
//! credential checking.

pub mod config;
pub mod error;

pub use config::{DirbindConfig, DirectoryConfig, LoggingConfig};
pub use error::{AuthFailure, Error, Result};

/// Dirbind version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default LDAP port
pub const DEFAULT_PORT: u16 = 389;

/// Default connect/operation timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Attribute holding the login name in the assumed directory schema
pub const LOGIN_ATTRIBUTE: &str = "sAMAccountName";

/// Attribute holding an entry's distinguished name
pub const DN_ATTRIBUTE: &str = "distinguishedName";
