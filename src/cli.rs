//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "contract-intake", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file. Defaults to settings.json in the platform config directory
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Process unread threads in the monitored label once
    Run,
    /// Serve the row store over HTTP
    Serve {
        /// Address to bind, overriding the settings file
        #[arg(long)]
        bind: Option<String>,
    },
    /// Store credentials in the OS keychain
    Setup {
        /// Anthropic API key
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// JSON file with refresh_token, client_id and client_secret
        #[arg(long, value_name = "PATH")]
        gmail_credentials: Option<PathBuf>,
    },
}
