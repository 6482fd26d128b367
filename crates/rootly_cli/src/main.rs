//! Rootly access sync CLI
//!
//! Command-line access sync for Rootly.
//!
//! # Commands
//!
//! - `sync` - Sync users, teams, secrets and schedules into a JSON snapshot
//! - `validate` - Check that the API key can read from Rootly
//! - `resource-types` - List the synchronized resource types
//! - `version` - Show version information

mod commands;
mod config;
mod http;

use clap::{Parser, Subcommand};
use config::Settings;
use http::ReqwestClient;
use rootly_client::{RootlyClient, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use rootly_connector::Connector;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rootly access sync.
#[derive(Parser)]
#[command(name = "rootly-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rootly API key
    #[arg(global = true, long, env = "ROOTLY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Rootly API base URL
    #[arg(global = true, long, env = "ROOTLY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Number of items requested per page
    #[arg(global = true, long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Request timeout in seconds
    #[arg(global = true, long, default_value_t = 30)]
    timeout: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync everything and print a JSON snapshot
    Sync {
        /// Write the snapshot to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the API key can read from Rootly
    Validate,

    /// List the synchronized resource types
    ResourceTypes {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            timeout_secs: self.timeout,
        }
    }

    fn connector(
        &self,
    ) -> Result<Connector<RootlyClient<ReqwestClient>>, Box<dyn std::error::Error>> {
        let config = self.settings().client_config()?;
        let transport = ReqwestClient::new(config.timeout)?;
        Ok(Connector::new(RootlyClient::new(config, transport)?))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Commands::Sync { output } => {
            let connector = cli.connector()?;
            commands::sync::run(&connector, output.as_deref(), &mut stdout)?;
        }
        Commands::Validate => {
            let connector = cli.connector()?;
            commands::validate::run(&connector, &mut stdout)?;
        }
        Commands::ResourceTypes { format } => {
            commands::resource_types::run(format, &mut stdout)?;
        }
        Commands::Version => {
            writeln!(stdout, "rootly-sync v{}", env!("CARGO_PKG_VERSION"))?;
        }
    }

    Ok(())
}
