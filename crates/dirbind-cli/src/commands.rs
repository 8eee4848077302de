//! Subcommand implementations

use anyhow::Result;
use dirbind_auth::{
    AuthFailure, AuthOutcome, CredentialResolver, DirectoryEndpoint, Error, Ldap3Connector,
};
use dirbind_core::DirbindConfig;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::Commands;

pub const EXIT_OK: u8 = 0;
pub const EXIT_REJECTED: u8 = 1;
pub const EXIT_UNAVAILABLE: u8 = 2;

pub async fn run(command: Commands, config: &DirbindConfig) -> Result<ExitCode> {
    match command {
        Commands::Probe => probe(config).await,
        Commands::FindDn { login } => find_dn(config, &login).await,
        Commands::Auth { login, password } => auth(config, &login, &password).await,
        Commands::TryAuth { login, password } => try_auth(config, &login, &password).await,
    }
}

async fn probe(config: &DirbindConfig) -> Result<ExitCode> {
    let directory = &config.directory;
    let connector = Ldap3Connector::new(Duration::from_secs(directory.timeout_seconds));
    let endpoint = DirectoryEndpoint::with_connector(
        directory.host.clone(),
        directory.port,
        Arc::new(connector),
    )
    .await?;

    println!("reachable: {}", endpoint);
    Ok(ExitCode::from(EXIT_OK))
}

async fn find_dn(config: &DirbindConfig, login: &str) -> Result<ExitCode> {
    let resolver = CredentialResolver::from_config(&config.directory).await?;

    match resolver.find_distinguished_name(login).await {
        Ok(dn) => {
            println!("{}", dn);
            Ok(ExitCode::from(EXIT_OK))
        }
        Err(Error::Authentication(AuthFailure::UserNotFound)) => {
            println!("{}", AuthOutcome::UserNotFound.as_str());
            Ok(ExitCode::from(EXIT_REJECTED))
        }
        Err(e) => Err(e.into()),
    }
}

async fn auth(config: &DirbindConfig, login: &str, password: &str) -> Result<ExitCode> {
    let resolver = CredentialResolver::from_config(&config.directory).await?;

    let outcome = resolver.check(login, password).await;
    info!("Authentication of {:?}: {}", login, outcome.as_str());

    match &outcome {
        AuthOutcome::ConnectionFailed(reason) => println!("{}: {}", outcome.as_str(), reason),
        _ => println!("{}", outcome.as_str()),
    }
    Ok(ExitCode::from(exit_code(&outcome)))
}

async fn try_auth(config: &DirbindConfig, login: &str, password: &str) -> Result<ExitCode> {
    let resolver = CredentialResolver::from_config(&config.directory).await?;

    let accepted = resolver.try_authenticate(login, password).await?;
    println!("{}", accepted);

    Ok(ExitCode::from(if accepted { EXIT_OK } else { EXIT_REJECTED }))
}

pub fn exit_code(outcome: &AuthOutcome) -> u8 {
    match outcome {
        AuthOutcome::Authenticated => EXIT_OK,
        AuthOutcome::UserNotFound
        | AuthOutcome::WrongPassword
        | AuthOutcome::UnspecifiedAuthFailure => EXIT_REJECTED,
        AuthOutcome::ConnectionFailed(_) => EXIT_UNAVAILABLE,
    }
}
