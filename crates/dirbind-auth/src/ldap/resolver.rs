//! Login resolution and authentication
//!
//! Authentication is search-then-bind: a privileged (root) session looks the
//! login up under the base DN, then the resolved DN is bound with the
//! caller's password on a fresh connection.

use crate::ldap::endpoint::{DirectoryEndpoint, DirectorySession};
use crate::ldap::filter::login_filter;
use crate::ldap::transport::Ldap3Connector;
use crate::ldap::types::AuthOutcome;
use dirbind_core::{AuthFailure, DirectoryConfig, Error, Result, DN_ATTRIBUTE};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolves logins to DNs with a privileged account and checks passwords.
#[derive(Clone)]
pub struct CredentialResolver {
    endpoint: DirectoryEndpoint,
    root_dn: String,
    root_password: SecretString,
    base_dn: String,
}

impl CredentialResolver {
    /// Create a resolver, verifying the root credentials with a live bind.
    ///
    /// A rejected root bind is reported as [`Error::ConnectionFailed`]: it is a
    /// misconfiguration, not a user authentication result.
    pub async fn new(
        endpoint: DirectoryEndpoint,
        root_dn: impl Into<String>,
        root_password: impl Into<SecretString>,
        base_dn: impl Into<String>,
    ) -> Result<Self> {
        let root_dn = root_dn.into();
        let root_password = root_password.into();
        let base_dn = base_dn.into();

        if root_dn.is_empty() {
            return Err(Error::invalid_argument("root DN must not be empty"));
        }
        if root_password.expose_secret().is_empty() {
            return Err(Error::invalid_argument("root password must not be empty"));
        }
        if base_dn.is_empty() {
            return Err(Error::invalid_argument("base DN must not be empty"));
        }

        let resolver = Self {
            endpoint,
            root_dn,
            root_password,
            base_dn,
        };

        resolver.root_session().await?.close().await;
        info!("Credential resolver ready: {}", resolver);

        Ok(resolver)
    }

    /// Build the endpoint and the resolver in one step.
    pub async fn connect(
        host: impl Into<String>,
        port: u16,
        root_dn: impl Into<String>,
        root_password: impl Into<SecretString>,
        base_dn: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = DirectoryEndpoint::new(host, port).await?;
        Self::new(endpoint, root_dn, root_password, base_dn).await
    }

    /// Build a resolver from configuration, honouring its timeout.
    pub async fn from_config(config: &DirectoryConfig) -> Result<Self> {
        config.validate()?;

        let connector = Ldap3Connector::new(Duration::from_secs(config.timeout_seconds));
        let endpoint = DirectoryEndpoint::with_connector(
            config.host.clone(),
            config.port,
            Arc::new(connector),
        )
        .await?;

        Self::new(
            endpoint,
            config.root_dn.clone(),
            config.root_password.clone(),
            config.base_dn.clone(),
        )
        .await
    }

    /// The directory server this resolver talks to.
    pub fn endpoint(&self) -> &DirectoryEndpoint {
        &self.endpoint
    }

    /// DN of the privileged account used for searches.
    pub fn root_dn(&self) -> &str {
        &self.root_dn
    }

    /// Search base for login lookups.
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Find the DN of the entry whose login attribute equals `login`.
    ///
    /// The first entry in server order wins when several match.
    pub async fn find_distinguished_name(&self, login: &str) -> Result<String> {
        let filter = login_filter(login);

        let mut session = self.root_session().await?;
        debug!("Searching {} with filter {}", self.base_dn, filter);
        let result = session
            .search_subtree(&self.base_dn, &filter, &[DN_ATTRIBUTE])
            .await;
        session.close().await;

        let entry = match result?.into_iter().next() {
            Some(entry) => entry,
            None => {
                debug!("No entry for login {:?}", login);
                return Err(AuthFailure::UserNotFound.into());
            }
        };

        match entry.first(DN_ATTRIBUTE) {
            Some(dn) if !dn.is_empty() => {
                debug!("Resolved login {:?} to {}", login, dn);
                Ok(dn.to_string())
            }
            _ => {
                warn!("Entry {} has no usable {} value", entry.dn, DN_ATTRIBUTE);
                Err(Error::connection(format!(
                    "entry {} returned without {}",
                    entry.dn, DN_ATTRIBUTE
                )))
            }
        }
    }

    /// Check `password` for `login`, returning the resolved DN on success.
    ///
    /// Fails with [`AuthFailure::UserNotFound`] or
    /// [`AuthFailure::IncorrectPassword`] when the credential is rejected, and
    /// with [`Error::ConnectionFailed`] when it could not be checked.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<String> {
        let dn = self.find_distinguished_name(login).await?;

        match self.endpoint.bind(&dn, password).await {
            Ok(session) => {
                session.close().await;
                info!("Authenticated {}", dn);
                Ok(dn)
            }
            Err(Error::Authentication(failure)) => {
                warn!("Authentication failed for {}: {}", dn, failure);
                Err(AuthFailure::IncorrectPassword.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`authenticate`](Self::authenticate), but a rejected credential is
    /// `Ok(false)`. Connection failures are still errors.
    pub async fn try_authenticate(&self, login: &str, password: &str) -> Result<bool> {
        match self.authenticate(login, password).await {
            Ok(_) => Ok(true),
            Err(Error::Authentication(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Run [`authenticate`](Self::authenticate) and classify the result.
    pub async fn check(&self, login: &str, password: &str) -> AuthOutcome {
        AuthOutcome::from_result(self.authenticate(login, password).await)
    }

    async fn root_session(&self) -> Result<DirectorySession> {
        self.endpoint
            .bind(&self.root_dn, self.root_password.expose_secret())
            .await
            .map_err(|e| match e {
                Error::Authentication(failure) => {
                    warn!("Root bind as {} rejected: {}", self.root_dn, failure);
                    Error::connection(format!(
                        "root bind as {} rejected: {}",
                        self.root_dn, failure
                    ))
                }
                other => other,
            })
    }
}

impl PartialEq for CredentialResolver {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint
            && self.root_dn == other.root_dn
            && self.root_password.expose_secret() == other.root_password.expose_secret()
            && self.base_dn == other.base_dn
    }
}

impl Eq for CredentialResolver {}

impl Hash for CredentialResolver {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.endpoint.hash(state);
        self.root_dn.hash(state);
        self.base_dn.hash(state);
    }
}

impl fmt::Display for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(server: {}, root: {}, password: [hidden], base DN: {})",
            self.endpoint, self.root_dn, self.base_dn
        )
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialResolver{}", self)
    }
}
