use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ControllerError, EditOutcome, HttpItemStore, ListController, ListFallback,
};
use shared::domain::ItemId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Single-list to-do client for a remote item store")]
struct Cli {
    /// Overrides SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Overrides PORT.
    #[arg(long)]
    port: Option<u16>,
    /// Show a placeholder list instead of failing when the list call fails.
    #[arg(long)]
    placeholder_on_list_failure: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the list.
    List,
    Add {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    Remove {
        id: String,
    },
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    Toggle {
        id: String,
    },
    /// Interactive session over stdin.
    Shell,
}

type Controller = ListController<HttpItemStore>;

/// Accepts a full id or an unambiguous prefix of one.
async fn resolve_id(controller: &Controller, raw: &str) -> Result<ItemId> {
    let items = controller.items().await;
    if let Some(item) = items.iter().find(|item| item.uid.as_str() == raw) {
        return Ok(item.uid.clone());
    }
    let mut matches = items.iter().filter(|item| item.uid.as_str().starts_with(raw));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item.uid.clone()),
        (Some(_), Some(_)) => bail!("id prefix '{raw}' is ambiguous"),
        (None, _) => Err(ControllerError::UnknownItem(ItemId::from(raw)).into()),
    }
}

async fn run(controller: &Controller, command: Command) -> Result<()> {
    match command {
        Command::List | Command::Shell => {}
        Command::Add { description } => {
            controller.add(&description.join(" ")).await?;
        }
        Command::Remove { id } => {
            let id = resolve_id(controller, &id).await?;
            controller.remove(&id).await?;
        }
        Command::Edit { id, description } => {
            let id = resolve_id(controller, &id).await?;
            controller.start_edit(&id).await?;
            let outcome = controller.commit_edit(&id, &description.join(" ")).await?;
            if outcome == EditOutcome::Unchanged {
                println!("description unchanged; nothing sent");
            }
        }
        Command::Toggle { id } => {
            let id = resolve_id(controller, &id).await?;
            controller.toggle_done(&id).await?;
        }
    }
    Ok(())
}

const SHELL_HELP: &str = "commands: list | add <text> | rm <id> | edit <id> | draft <text> | save | cancel | toggle <id> | help | quit";

async fn shell_line(controller: &Controller, line: &str) -> Result<bool> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match word {
        "" => return Ok(true),
        "quit" | "exit" => return Ok(false),
        "help" => {
            println!("{SHELL_HELP}");
            return Ok(true);
        }
        "list" | "ls" => {}
        "add" => {
            controller.add(rest).await?;
        }
        "rm" | "remove" => {
            let id = resolve_id(controller, rest).await?;
            controller.remove(&id).await?;
        }
        "edit" => {
            let id = resolve_id(controller, rest).await?;
            let session = controller.start_edit(&id).await?;
            println!("editing '{}'; use draft <text> then save", session.draft);
        }
        "draft" => controller.set_edit_draft(rest).await?,
        "save" => {
            if controller.save_edit().await? == EditOutcome::Unchanged {
                println!("description unchanged; nothing sent");
            }
        }
        "cancel" => controller.cancel_edit().await,
        "toggle" | "done" => {
            let id = resolve_id(controller, rest).await?;
            controller.toggle_done(&id).await?;
        }
        other => bail!("unknown command '{other}'; try help"),
    }
    println!("{}", render::render(&controller.view().await));
    Ok(true)
}

async fn shell(controller: &Controller) -> Result<()> {
    println!("{}", render::render(&controller.view().await));
    println!("{SHELL_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match shell_line(controller, &line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                tracing::debug!(error = %err, "todo: shell command failed");
                match err.downcast_ref::<ControllerError>() {
                    // The notification line already carries the store's reason.
                    Some(ControllerError::Store(_)) => {
                        println!("{}", render::render(&controller.view().await));
                    }
                    _ => eprintln!("error: {err}"),
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(port) = cli.port {
        settings.port = Some(port);
    }
    if cli.placeholder_on_list_failure {
        settings.list_fallback = ListFallback::Placeholder;
    }
    tracing::info!(base_url = %settings.base_url()?, "todo: using item store");

    let store = Arc::new(HttpItemStore::new(&settings)?);
    let controller = ListController::new(store);
    controller.load().await?;

    let command = cli.command.unwrap_or(Command::List);
    if matches!(command, Command::Shell) {
        return shell(&controller).await;
    }

    let outcome = run(&controller, command).await;
    println!("{}", render::render(&controller.view().await));
    outcome
}
