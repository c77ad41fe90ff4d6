//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::request::RequestArgs;
use crate::commands::tokens::TokensCommand;

/// Issue authenticated HTTP requests with automatic token refresh.
#[derive(Parser, Debug)]
#[command(name = "authwire")]
#[command(author, version = env!("AUTHWIRE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Credential file (defaults to the platform data directory)
    #[arg(long, env = "AUTHWIRE_STORE", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored access and refresh tokens
    Tokens(TokensCommand),

    /// Send an authenticated request
    Request(RequestArgs),
}
