//! Dirbind - directory credential checker
//!
//! Resolves a login through a privileged search and verifies the password
//! with a bind. Exit status: 0 accepted, 1 rejected, 2 could not check.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dirbind_core::{DirbindConfig, LoggingConfig};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::EXIT_UNAVAILABLE;

#[derive(Parser, Debug)]
#[command(name = "dirbind")]
#[command(version = dirbind_core::VERSION)]
#[command(about = "Check credentials against an LDAP / Active Directory server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DIRBIND_CONFIG")]
    config: Option<String>,

    /// Directory server host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Directory server port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// DN of the privileged search account
    #[arg(long, global = true)]
    root_dn: Option<String>,

    /// Subtree searched for logins
    #[arg(long, global = true)]
    base_dn: Option<String>,

    /// Connect and operation timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the server answers an anonymous bind
    Probe,

    /// Print the DN a login resolves to
    FindDn {
        login: String,
    },

    /// Authenticate a login and report the outcome
    Auth {
        login: String,

        /// Password to check
        #[arg(long, env = "DIRBIND_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Authenticate a login and print true or false
    TryAuth {
        login: String,

        /// Password to check
        #[arg(long, env = "DIRBIND_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("dirbind: {:#}", e);
            return ExitCode::from(EXIT_UNAVAILABLE);
        }
    };

    init_logging(&config.logging);

    match commands::run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("dirbind: {:#}", e);
            ExitCode::from(EXIT_UNAVAILABLE)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<DirbindConfig> {
    let mut config = if let Some(path) = &cli.config {
        let mut config = DirbindConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path))?;
        config.apply_env();
        config
    } else {
        DirbindConfig::from_env()
    };

    // Command-line flags win over file and environment
    if let Some(host) = &cli.host {
        config.directory.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.directory.port = port;
    }
    if let Some(root_dn) = &cli.root_dn {
        config.directory.root_dn = root_dn.clone();
    }
    if let Some(base_dn) = &cli.base_dn {
        config.directory.base_dn = base_dn.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.directory.timeout_seconds = timeout;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    Ok(config)
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // stdout carries results; logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
