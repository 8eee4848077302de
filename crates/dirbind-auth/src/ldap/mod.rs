//! LDAP / Active Directory credential checking
//!
//! - [`DirectoryEndpoint`]: one server, anonymous and simple binds
//! - [`CredentialResolver`]: login to DN resolution through a privileged
//!   search, then a bind with the user's password
//!
//! Every operation opens its own connections and releases them before
//! returning.

mod endpoint;
mod filter;
#[cfg(test)]
mod mock;
mod resolver;
mod transport;
mod types;

pub use endpoint::{DirectoryEndpoint, DirectorySession};
pub use filter::{escape_filter_value, login_filter};
pub use resolver::CredentialResolver;
pub use transport::{
    Connector, DirectoryEntry, Ldap3Connector, OperationStatus, Session, TransportError,
    RC_INAPPROPRIATE_AUTHENTICATION, RC_INVALID_CREDENTIALS, RC_SUCCESS,
};
pub use types::AuthOutcome;
