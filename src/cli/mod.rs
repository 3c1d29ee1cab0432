//! # Command Line Interface
//!
//! `lbclone clone ...` copies a load balancer between namespaces;
//! `lbclone config ...` manages the CLI configuration file.

pub mod clone;
pub mod config;
pub mod config_cmd;
pub mod output;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::CloneError;
use crate::observability::{init_logging, LogFormat};
use crate::store::{ClientConfig, HttpObjectStore};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "lbclone")]
#[command(about = "Clone HTTP load balancers and their dependencies between namespaces")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging, including request and response bodies
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Path to file containing the API token
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Base URL of the config API
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy a load balancer and its dependencies into another namespace
    Clone(clone::CloneArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Clone(args) => {
            let file_config = CliConfig::load()?;
            let store = create_store(
                cli.token,
                cli.token_file,
                cli.base_url,
                cli.timeout,
                cli.verbose,
                &file_config,
            )?;
            clone::handle_clone_command(args, Arc::new(store), &file_config).await?
        }
        Commands::Config { command } => config_cmd::handle_config_command(command).await?,
    }

    Ok(())
}

/// Create the HTTP object store with resolved credentials
fn create_store(
    token: Option<String>,
    token_file: Option<PathBuf>,
    base_url: Option<String>,
    timeout: Option<u64>,
    verbose: bool,
    file_config: &CliConfig,
) -> anyhow::Result<HttpObjectStore> {
    let token = config::resolve_token(token, token_file, file_config)?;
    let base_url = config::resolve_base_url(base_url, file_config)?;
    let timeout = config::resolve_timeout(timeout, file_config);

    Ok(HttpObjectStore::new(ClientConfig { base_url, token, timeout, verbose })?)
}

/// Print a fatal error and, for API failures, the request/response details
pub fn report_error(error: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red(), error);

    let diagnostics = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CloneError>())
        .and_then(CloneError::diagnostics);
    if let Some(diagnostics) = diagnostics {
        eprintln!("{}", diagnostics);
    }
}
