// Copyright 2026 RentScout Contributors
// SPDX-License-Identifier: MIT

//! RentScout entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use rentscout::{DiscoveryConfig, Discoverer};
use rentscout_cli::config::{init_logging, resolve_listen_addr, LogFormat};
use rentscout_cli::output::render_table;
use rentscout_cli::rest::{self, AppState};

#[derive(Parser)]
#[command(
    name = "rentscout",
    about = "Discover rental listings for a housing society and report the top rent per BHK",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one discovery and print the result.
    Discover {
        /// Society name, as it appears in listing titles.
        society: String,

        /// City the society is in.
        #[arg(long)]
        city: String,

        /// Print the full discovery report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start the REST API (default).
    Serve {
        /// Listen address (host:port).
        /// Falls back to RENTSCOUT_ADDR, then 0.0.0.0:$PORT.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   rentscout completions bash > ~/.local/share/bash-completion/completions/rentscout
    ///   rentscout completions zsh > ~/.zfunc/_rentscout
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format);

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Discover {
            society,
            city,
            json,
        } => {
            let discoverer = Discoverer::new(DiscoveryConfig::from_env())?;
            let report = discoverer.discover_report(&society, &city).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_table(&report));
            }
        }

        Commands::Serve { addr } => {
            let config = DiscoveryConfig::from_env();
            tracing::info!("RentScout REST API");
            tracing::info!("Primary source: {}/{}", config.site_root, config.listings_path);
            let state = Arc::new(AppState::new(Discoverer::new(config)?));
            let addr = resolve_listen_addr(addr.as_deref());
            rest::serve(&addr, state).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rentscout", &mut std::io::stdout());
        }
    }

    Ok(())
}
