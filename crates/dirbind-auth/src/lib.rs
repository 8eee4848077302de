//! Directory authentication for Dirbind

pub mod ldap;

pub use dirbind_core::{AuthFailure, Error, Result};
pub use ldap::{
    escape_filter_value, AuthOutcome, Connector, CredentialResolver, DirectoryEndpoint,
    DirectoryEntry, DirectorySession, Ldap3Connector, OperationStatus, Session, TransportError,
};
