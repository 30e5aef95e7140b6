use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::session;

/// Validates a session id before any filesystem access
fn validate_session(s: &str) -> Result<String, String> {
    session::validate_session_id(s)
        .map(|()| s.to_string())
        .map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "unsealer")]
#[command(about = "Unseal a threshold-sealed master key by entering key shares")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enter key shares until the master key is reconstructed
    ///
    /// Shares can be passed as arguments for scripting, but they may then
    /// live in your shell history. Without arguments, shares are prompted
    /// for with hidden input.
    Unseal {
        /// Seal configuration file
        #[arg(short, long, env = "UNSEALER_CONFIG")]
        config: PathBuf,

        /// Throw away shares entered so far before doing anything else
        #[arg(long)]
        reset: bool,

        /// Status output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Share tokens (not recommended, see above)
        keys: Vec<String>,
    },
    /// Show the seal configuration (share count, threshold, key length)
    ///
    /// Unseal progress is held by the running coordinator and is not
    /// reported here.
    Config {
        /// Seal configuration file
        #[arg(short, long, env = "UNSEALER_CONFIG")]
        config: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Manage the cached auth token of a client session
    Token {
        /// Session id
        #[arg(short, long, value_parser = validate_session)]
        session: String,

        /// Directory holding the per-session token files
        #[arg(long, default_value = "tmp")]
        root: PathBuf,

        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenAction {
    /// Print the cached token
    Get,
    /// Cache the token read from stdin
    Store,
    /// Remove the cached token
    Erase,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
