//! Tests against a real directory server.
//!
//! Point them at a server with `DIRBIND_TEST_HOST`, `DIRBIND_TEST_PORT`,
//! `DIRBIND_TEST_ROOT_DN`, `DIRBIND_TEST_ROOT_PASSWORD`, `DIRBIND_TEST_BASE_DN`,
//! `DIRBIND_TEST_LOGIN` and `DIRBIND_TEST_PASSWORD`, then run with `--ignored`.

use dirbind_auth::{AuthFailure, CredentialResolver, DirectoryEndpoint, Error};

struct LiveTarget {
    host: String,
    port: u16,
    root_dn: String,
    root_password: String,
    base_dn: String,
    login: String,
    password: String,
}

fn var(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn target() -> LiveTarget {
    LiveTarget {
        host: var("DIRBIND_TEST_HOST", "localhost"),
        port: var("DIRBIND_TEST_PORT", "389").parse().unwrap(),
        root_dn: var("DIRBIND_TEST_ROOT_DN", "cn=admin,dc=example,dc=com"),
        root_password: var("DIRBIND_TEST_ROOT_PASSWORD", "admin"),
        base_dn: var("DIRBIND_TEST_BASE_DN", "dc=example,dc=com"),
        login: var("DIRBIND_TEST_LOGIN", "jdoe"),
        password: var("DIRBIND_TEST_PASSWORD", "secret123"),
    }
}

async fn resolver(t: &LiveTarget) -> CredentialResolver {
    CredentialResolver::connect(
        t.host.clone(),
        t.port,
        t.root_dn.clone(),
        t.root_password.clone(),
        t.base_dn.clone(),
    )
    .await
    .expect("directory should be reachable with the root credentials")
}

#[tokio::test]
#[ignore = "requires LDAP server configured via DIRBIND_TEST_*"]
async fn test_authenticate_success() {
    let t = target();
    let resolver = resolver(&t).await;

    let dn = resolver.authenticate(&t.login, &t.password).await.unwrap();
    assert_eq!(resolver.find_distinguished_name(&t.login).await.unwrap(), dn);
    assert!(resolver.try_authenticate(&t.login, &t.password).await.unwrap());
}

#[tokio::test]
#[ignore = "requires LDAP server configured via DIRBIND_TEST_*"]
async fn test_authenticate_wrong_password() {
    let t = target();
    let resolver = resolver(&t).await;

    let err = resolver
        .authenticate(&t.login, "definitely-not-the-password")
        .await
        .unwrap_err();
    assert_eq!(err, Error::Authentication(AuthFailure::IncorrectPassword));
}

#[tokio::test]
#[ignore = "requires LDAP server configured via DIRBIND_TEST_*"]
async fn test_authenticate_unknown_user() {
    let t = target();
    let resolver = resolver(&t).await;

    let err = resolver
        .authenticate("no-such-user-dirbind", "x")
        .await
        .unwrap_err();
    assert_eq!(err, Error::Authentication(AuthFailure::UserNotFound));
}

#[tokio::test]
#[ignore = "requires LDAP server configured via DIRBIND_TEST_*"]
async fn test_wrong_root_password_rejected_at_construction() {
    let t = target();
    let endpoint = DirectoryEndpoint::new(t.host.clone(), t.port).await.unwrap();

    let err = CredentialResolver::new(
        endpoint,
        t.root_dn.clone(),
        "wrong-root-password",
        t.base_dn.clone(),
    )
    .await
    .unwrap_err();
    assert!(err.is_connection_failure());
}

#[tokio::test]
async fn test_unreachable_server() {
    // Nothing listens on port 1 of the loopback interface.
    let err = DirectoryEndpoint::new("127.0.0.1", 1).await.unwrap_err();
    assert!(err.is_connection_failure());
}
