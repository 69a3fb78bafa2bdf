//! CLI module for eventum
//!
//! Parses arguments, loads configuration and boots the HTTP server.
//! `main.rs` delegates everything to [`run`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::http_server::{ConfigError, HttpServer, HttpServerConfig};

/// eventum - a small multi-tenant event scheduling API
#[derive(Parser, Debug)]
#[command(name = "eventum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the eventum API server
    Serve {
        /// Path to a JSON configuration file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Parse arguments and dispatch
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli.command {
        Command::Serve { config, port } => serve(config, port),
    }
}

fn serve(config_path: Option<PathBuf>, port: Option<u16>) -> Result<(), CliError> {
    let mut config = match config_path {
        Some(path) => HttpServerConfig::load(&path)?,
        None => HttpServerConfig::default(),
    };
    if let Some(port) = port {
        config.port = port;
    }

    let server = HttpServer::with_config(config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.start())?;

    Ok(())
}
