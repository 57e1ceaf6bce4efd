use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{Anonymous, ApiClient, EventsApi, StaticToken, TokenProvider};
use shared::domain::EventId;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "eventflow", about = "Create, edit and browse EventFlow events")]
struct Args {
    /// Settings file (defaults to ./eventflow.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an event from a TOML draft.
    Create {
        #[arg(long)]
        draft: PathBuf,
    },
    /// Apply a TOML draft to an existing event.
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        draft: PathBuf,
    },
    Show {
        #[arg(long)]
        id: String,
    },
    /// Print a month of events.
    Calendar {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        category: Option<String>,
    },
    Invite {
        #[arg(long)]
        id: String,
        #[arg(required = true)]
        emails: Vec<String>,
    },
}

fn build_client(settings: &Settings) -> Result<ApiClient> {
    let tokens: Arc<dyn TokenProvider> = match &settings.api_token {
        Some(token) => Arc::new(StaticToken::new(token.clone())),
        None => Arc::new(Anonymous),
    };
    ApiClient::with_timeout(&settings.api_url, tokens, settings.request_timeout())
        .with_context(|| format!("invalid api_url {}", settings.api_url))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    let client = build_client(&settings)?;
    tracing::debug!(api_url = %client.base_url(), "client ready");

    match args.command {
        Command::Create { draft } => {
            let patch = commands::read_patch(&draft)?;
            let (id, report) = commands::create_event(&client, patch).await?;
            println!("Created event {id}");
            print!("{}", commands::render_invites(&report));
        }
        Command::Edit { id, draft } => {
            let patch = commands::read_patch(&draft)?;
            let (id, report) = commands::edit_event(&client, &EventId::new(id), patch).await?;
            println!("Updated event {id}");
            print!("{}", commands::render_invites(&report));
        }
        Command::Show { id } => {
            let record = client
                .get_event(&EventId::new(id.clone()))
                .await
                .with_context(|| format!("failed to load event {id}"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Calendar {
            year,
            month,
            category,
        } => {
            let category = category
                .as_deref()
                .map(commands::parse_category)
                .transpose()?;
            let grid = commands::month_grid(&client, year, month, category).await?;
            print!("{}", commands::render_grid(&grid));
        }
        Command::Invite { id, emails } => {
            let mut guests = client_core::fields::GuestList::new();
            for rejected in guests.extend(emails.iter().map(String::as_str)) {
                eprintln!("skipping {rejected}");
            }
            let report =
                commands::invite_guests(&client, &EventId::new(id), guests.as_slice()).await;
            print!("{}", commands::render_invites(&report));
        }
    }

    Ok(())
}
