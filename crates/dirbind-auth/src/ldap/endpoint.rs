//! Directory server endpoint
//!
//! A [`DirectoryEndpoint`] names one server by host and port. It holds no
//! connection: every bind opens a fresh one, and the returned
//! [`DirectorySession`] owns it until closed or dropped.

use crate::ldap::transport::{Connector, DirectoryEntry, Ldap3Connector, Session};
use dirbind_core::{AuthFailure, Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One directory server. Equality and hashing use (host, port) only.
#[derive(Clone)]
pub struct DirectoryEndpoint {
    host: String,
    port: u16,
    connector: Arc<dyn Connector>,
}

impl DirectoryEndpoint {
    /// Create an endpoint, verifying the server answers an anonymous bind.
    pub async fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::with_connector(host, port, Arc::new(Ldap3Connector::default())).await
    }

    /// Create an endpoint over an explicit transport.
    pub async fn with_connector(
        host: impl Into<String>,
        port: u16,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(Error::invalid_argument("host must not be empty"));
        }
        if port == 0 {
            return Err(Error::invalid_argument("port must be in 1-65535"));
        }

        let endpoint = Self {
            host,
            port,
            connector,
        };

        endpoint.root_bind().await?.close().await;
        info!("Directory server reachable: {}", endpoint);

        Ok(endpoint)
    }

    /// Host name or address, as given.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `ldap://host:port`, with IPv6 literals bracketed.
    pub fn url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("ldap://[{}]:{}", self.host, self.port)
        } else {
            format!("ldap://{}:{}", self.host, self.port)
        }
    }

    /// Open an anonymous session. Used to check reachability.
    pub async fn root_bind(&self) -> Result<DirectorySession> {
        let mut session = self.open().await?;

        match session.inner.simple_bind("", "").await {
            Ok(status) if status.is_success() => {
                debug!("Anonymous bind to {} succeeded", session.url);
                Ok(session)
            }
            Ok(status) => {
                session.close().await;
                warn!("Anonymous bind to {} refused: {}", self, status.describe());
                Err(Error::connection(format!(
                    "anonymous bind to {} refused ({})",
                    self,
                    status.describe()
                )))
            }
            Err(e) => {
                warn!("Anonymous bind to {} failed: {}", self, e);
                Err(Error::connection(format!("{}: {}", self, e)))
            }
        }
    }

    /// Open a session authenticated with a simple bind.
    ///
    /// A credential rejection by the server is
    /// [`AuthFailure::Unspecified`]; anything else that prevents the bind is
    /// [`Error::ConnectionFailed`].
    pub async fn bind(&self, dn: &str, password: &str) -> Result<DirectorySession> {
        if dn.is_empty() {
            return Err(Error::invalid_argument("bind DN must not be empty"));
        }
        // An empty password turns a simple bind into an unauthenticated bind,
        // which servers report as success.
        if password.is_empty() {
            debug!("Refusing bind with empty password for {}", dn);
            return Err(AuthFailure::Unspecified("empty password".to_string()).into());
        }

        let mut session = self.open().await?;

        let status = match session.inner.simple_bind(dn, password).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Bind as {} on {} failed: {}", dn, self, e);
                return Err(Error::connection(format!("{}: {}", self, e)));
            }
        };

        if status.is_success() {
            debug!("Bound as {} on {}", dn, self);
            return Ok(session);
        }

        session.close().await;

        if status.is_credential_rejection() {
            debug!("Credentials for {} rejected: {}", dn, status.describe());
            Err(AuthFailure::Unspecified(status.describe()).into())
        } else {
            warn!("Bind as {} on {} failed: {}", dn, self, status.describe());
            Err(Error::connection(format!(
                "bind to {} failed ({})",
                self,
                status.describe()
            )))
        }
    }

    /// Bind and immediately release the session.
    pub async fn authenticate(&self, dn: &str, password: &str) -> Result<()> {
        self.bind(dn, password).await?.close().await;
        Ok(())
    }

    /// `false` when the credentials were rejected; connection problems are errors.
    pub async fn try_authenticate(&self, dn: &str, password: &str) -> Result<bool> {
        match self.authenticate(dn, password).await {
            Ok(()) => Ok(true),
            Err(Error::Authentication(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn open(&self) -> Result<DirectorySession> {
        let url = self.url();
        let inner = self.connector.connect(&url).await.map_err(|e| {
            warn!("Failed to connect to {}: {}", url, e);
            Error::connection(format!("{}: {}", url, e))
        })?;
        Ok(DirectorySession { inner, url })
    }
}

impl PartialEq for DirectoryEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port && self.host == other.host
    }
}

impl Eq for DirectoryEndpoint {}

impl Hash for DirectoryEndpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl fmt::Display for DirectoryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

impl fmt::Debug for DirectoryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryEndpoint")
            .field("url", &self.url())
            .finish()
    }
}

/// An open, bound directory connection.
///
/// Dropping the session closes the connection; [`close`](Self::close) also
/// sends an unbind first.
pub struct DirectorySession {
    inner: Box<dyn Session>,
    url: String,
}

impl DirectorySession {
    /// URL of the server this session is connected to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Subtree search. A non-success result code is a connection failure.
    pub async fn search_subtree(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<DirectoryEntry>> {
        let (entries, status) = self
            .inner
            .search_subtree(base, filter, attrs)
            .await
            .map_err(|e| Error::connection(format!("search on {} failed: {}", self.url, e)))?;

        if !status.is_success() {
            return Err(Error::connection(format!(
                "search on {} failed ({})",
                self.url,
                status.describe()
            )));
        }

        Ok(entries)
    }

    /// Unbind and drop the connection. Unbind errors are only logged.
    pub async fn close(mut self) {
        if let Err(e) = self.inner.unbind().await {
            debug!("Unbind from {} failed: {}", self.url, e);
        }
    }
}

impl fmt::Debug for DirectorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorySession")
            .field("url", &self.url)
            .finish()
    }
}
