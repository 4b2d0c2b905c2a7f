pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionStore};

#[derive(Parser)]
#[command(name = "biblio")]
#[command(about = "Biblioteca CLI - command-line client for the library catalog API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Catalog record operations")]
    Book {
        #[command(subcommand)]
        cmd: commands::book::BookCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Gate for protected commands: restore the persisted session and refuse to
/// proceed without one. Runs fresh on every invocation, so an expired token
/// is evicted here and the user is pointed back at the login entry point.
pub fn require_session(store: &mut SessionStore) -> anyhow::Result<Session> {
    match store.restore()? {
        Some(session) => Ok(session.clone()),
        None => Err(anyhow::anyhow!(
            "Not authenticated. Run `biblio auth login <email>` first."
        )),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Book { cmd } => commands::book::handle(cmd, output_format).await,
    }
}
