//! Directory transport
//!
//! The wire protocol is handled by `ldap3`. The core only needs to open a
//! connection, bind, run a subtree search and unbind, so those four operations
//! are all [`Connector`] and [`Session`] expose. Result codes reported by the
//! server come back as data in [`OperationStatus`]; only failures to talk to
//! the server at all are [`TransportError`]s.

use async_trait::async_trait;
use dirbind_core::DEFAULT_TIMEOUT_SECS;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry, SearchResult};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// LDAP result code: success
pub const RC_SUCCESS: u32 = 0;
/// LDAP result code: inappropriateAuthentication
pub const RC_INAPPROPRIATE_AUTHENTICATION: u32 = 48;
/// LDAP result code: invalidCredentials
pub const RC_INVALID_CREDENTIALS: u32 = 49;

/// Failure to complete an exchange with the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("operation timed out")]
    Timeout,
}

impl From<LdapError> for TransportError {
    fn from(err: LdapError) -> Self {
        match err {
            LdapError::Timeout { .. } => TransportError::Timeout,
            other => TransportError::Protocol(other.to_string()),
        }
    }
}

/// Outcome of one operation as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStatus {
    pub rc: u32,
    pub text: String,
}

impl OperationStatus {
    /// A successful result with no diagnostic text.
    pub fn success() -> Self {
        Self {
            rc: RC_SUCCESS,
            text: String::new(),
        }
    }

    /// A result with the given code and diagnostic text.
    pub fn with_code(rc: u32, text: impl Into<String>) -> Self {
        Self {
            rc,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.rc == RC_SUCCESS
    }

    /// Whether the server refused the presented credentials.
    ///
    /// Only invalidCredentials counts. inappropriateAuthentication means the
    /// server will not accept a simple bind at all, which says nothing about
    /// the password.
    pub fn is_credential_rejection(&self) -> bool {
        self.rc == RC_INVALID_CREDENTIALS
    }

    /// Human readable form for logs and error messages.
    pub fn describe(&self) -> String {
        if self.text.is_empty() {
            format!("result code {}", self.rc)
        } else {
            format!("result code {}: {}", self.rc, self.text)
        }
    }
}

impl From<ldap3::LdapResult> for OperationStatus {
    fn from(res: ldap3::LdapResult) -> Self {
        Self {
            rc: res.rc,
            text: res.text,
        }
    }
}

/// A directory entry returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// An entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    /// Add one value to an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.entry(name.into()).or_default().push(value.into());
        self
    }

    /// First value of an attribute; attribute names compare case-insensitively.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

impl From<SearchEntry> for DirectoryEntry {
    fn from(entry: SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attrs: entry.attrs,
        }
    }
}

/// Opens connections to a directory server.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn Session>, TransportError>;
}

/// One open connection. Dropping it closes the connection.
#[async_trait]
pub trait Session: Send {
    async fn simple_bind(
        &mut self,
        dn: &str,
        password: &str,
    ) -> Result<OperationStatus, TransportError>;

    async fn search_subtree(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<(Vec<DirectoryEntry>, OperationStatus), TransportError>;

    async fn unbind(&mut self) -> Result<(), TransportError>;
}

/// [`Connector`] backed by `ldap3`.
#[derive(Debug, Clone)]
pub struct Ldap3Connector {
    timeout: Duration,
}

impl Ldap3Connector {
    /// `timeout` bounds the TCP connect and every later operation.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for Ldap3Connector {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl Connector for Ldap3Connector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Session>, TransportError> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout);

        debug!("Connecting to directory server: {}", url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, url)
            .await
            .map_err(|e| match e {
                LdapError::Timeout { .. } => TransportError::Timeout,
                other => TransportError::Unreachable(other.to_string()),
            })?;

        ldap3::drive!(conn);

        Ok(Box::new(Ldap3Session {
            ldap,
            timeout: self.timeout,
        }))
    }
}

struct Ldap3Session {
    ldap: Ldap,
    timeout: Duration,
}

#[async_trait]
impl Session for Ldap3Session {
    async fn simple_bind(
        &mut self,
        dn: &str,
        password: &str,
    ) -> Result<OperationStatus, TransportError> {
        let res = self
            .ldap
            .with_timeout(self.timeout)
            .simple_bind(dn, password)
            .await?;
        Ok(res.into())
    }

    async fn search_subtree(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<(Vec<DirectoryEntry>, OperationStatus), TransportError> {
        let SearchResult(rs, res) = self
            .ldap
            .with_timeout(self.timeout)
            .search(base, Scope::Subtree, filter, attrs.to_vec())
            .await?;

        // Continuation references are not entries.
        let entries = rs
            .into_iter()
            .filter(|entry| !entry.is_ref())
            .map(SearchEntry::construct)
            .map(DirectoryEntry::from)
            .collect();

        Ok((entries, res.into()))
    }

    async fn unbind(&mut self) -> Result<(), TransportError> {
        self.ldap.unbind().await?;
        Ok(())
    }
}
