//! Token management commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Subcommand};
use colored::Colorize;
use serde::Serialize;

use authwire_core::{CredentialStore, Slot};
use authwire_file::FileCredentialStore;

use crate::output;

#[derive(Args, Debug)]
pub struct TokensCommand {
    #[command(subcommand)]
    pub command: TokensSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TokensSubcommand {
    /// Store an access and/or refresh token
    Set(SetArgs),

    /// Display the stored tokens
    Show(ShowArgs),

    /// Remove all stored tokens
    Clear,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("token").required(true).multiple(true).args(["access", "refresh"])))]
pub struct SetArgs {
    /// Access token sent as the bearer credential
    #[arg(long)]
    pub access: Option<String>,

    /// Refresh token exchanged for new access tokens
    #[arg(long)]
    pub refresh: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Print the full token values
    #[arg(long)]
    pub reveal: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TokensView {
    path: String,
    access: Option<String>,
    refresh: Option<String>,
    updated_at: Option<String>,
}

pub async fn handle(cmd: TokensCommand, store: Arc<FileCredentialStore>) -> Result<()> {
    match cmd.command {
        TokensSubcommand::Set(args) => set(args, &store).await,
        TokensSubcommand::Show(args) => show(args, &store).await,
        TokensSubcommand::Clear => clear(&store),
    }
}

async fn set(args: SetArgs, store: &FileCredentialStore) -> Result<()> {
    if let Some(access) = &args.access {
        store
            .set(Slot::Access, access)
            .await
            .context("Failed to store access token")?;
    }
    if let Some(refresh) = &args.refresh {
        store
            .set(Slot::Refresh, refresh)
            .await
            .context("Failed to store refresh token")?;
    }

    output::success(&format!("Tokens saved to {}", store.path().display()));
    Ok(())
}

async fn show(args: ShowArgs, store: &FileCredentialStore) -> Result<()> {
    let display = |token: Option<String>| {
        token.map(|t| if args.reveal { t } else { mask(&t) })
    };

    let view = TokensView {
        path: store.path().display().to_string(),
        access: display(store.get(Slot::Access).await.context("Failed to read tokens")?),
        refresh: display(store.get(Slot::Refresh).await.context("Failed to read tokens")?),
        updated_at: store
            .updated_at()
            .context("Failed to read tokens")?
            .map(|t| t.to_rfc3339()),
    };

    if args.json {
        return output::json(&view);
    }

    let not_set = "(not set)".dimmed().to_string();
    output::field("File", &view.path);
    output::field("Access", view.access.as_deref().unwrap_or(&not_set));
    output::field("Refresh", view.refresh.as_deref().unwrap_or(&not_set));
    if let Some(updated_at) = &view.updated_at {
        output::field("Updated", updated_at);
    }

    Ok(())
}

fn clear(store: &FileCredentialStore) -> Result<()> {
    store.clear().context("Failed to clear tokens")?;
    output::success("Tokens cleared");
    Ok(())
}

/// Keep a short prefix so tokens can be told apart without exposing them.
fn mask(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        "********".to_string()
    } else {
        format!("{}********", prefix)
    }
}
