use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_success, prompt_line};
use crate::cli::{require_session, OutputFormat};
use crate::gateway::AuthGateway;
use crate::session::SessionStore;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and store the issued token")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Register a new user")]
    Register {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "user", help = "Role for the new user")]
        role: String,
    },

    #[command(about = "Clear the stored token")]
    Logout,

    #[command(about = "Show the current user")]
    Whoami,

    #[command(about = "Show current authentication status")]
    Status,
}

fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_line("Password"),
    }
}

fn expiry_string(expires_at: i64) -> String {
    chrono::DateTime::from_timestamp(expires_at, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| expires_at.to_string())
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = resolve_password(password)?;
            let token = AuthGateway::from_config().login(&email, &password).await?;

            let mut store = SessionStore::open()?;
            match store.login(&token)? {
                Some(session) => output_success(
                    &output_format,
                    &format!("Logged in as {} ({})", session.subject, session.role),
                    Some(json!({
                        "subject": session.subject,
                        "role": session.role,
                        "expires_at": expiry_string(session.expires_at),
                    })),
                ),
                // The store already cleared the slot; nothing usable came back.
                None => Err(anyhow::anyhow!(
                    "Login failed: the server returned an invalid or expired token"
                )),
            }
        }
        AuthCommands::Register { email, password, role } => {
            let password = resolve_password(password)?;
            AuthGateway::from_config()
                .register(&email, &password, &role)
                .await?;

            output_success(
                &output_format,
                &format!("Registered {} with role '{}'", email, role),
                None,
            )
        }
        AuthCommands::Logout => {
            let mut store = SessionStore::open()?;
            store.logout()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Whoami => {
            let mut store = SessionStore::open()?;
            let session = require_session(&mut store)?;

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "subject": session.subject,
                            "role": session.role,
                            "expires_at": expiry_string(session.expires_at),
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{} ({})", session.subject, session.role);
                    println!("Token expires at {}", expiry_string(session.expires_at));
                }
            }
            Ok(())
        }
        AuthCommands::Status => {
            let mut store = SessionStore::open()?;
            match store.restore()? {
                Some(session) => output_success(
                    &output_format,
                    &format!("Authenticated as {}", session.subject),
                    Some(json!({
                        "authenticated": true,
                        "subject": session.subject,
                        "role": session.role,
                        "expires_at": expiry_string(session.expires_at),
                    })),
                ),
                None => match output_format {
                    OutputFormat::Json => {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({ "authenticated": false }))?
                        );
                        Ok(())
                    }
                    OutputFormat::Text => {
                        println!("Not authenticated");
                        Ok(())
                    }
                },
            }
        }
    }
}
