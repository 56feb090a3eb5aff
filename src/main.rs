//! `bugtrack`: command-line access to the bug tracker backend.
//!
//! Startup sequence:
//!   1. Parse arguments (usage errors exit with status 2)
//!   2. Load .env (if present)
//!   3. Load config; missing Supabase env vars abort here with status 1
//!   4. Init logger at the configured level
//!   5. Install the shared client and run one command

mod cli;

use std::process;

use bugtrack_client::{
    AppError, Bug, Bugs,
    client::{self, Query},
    config, logger,
};
use tracing::info;

use crate::cli::{Args, Command, Invocation};

#[tokio::main]
async fn main() {
    let args = match cli::parse(std::env::args().skip(1)) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Help) => {
            cli::print_help();
            return;
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            cli::print_help();
            process::exit(2);
        }
    };

    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level, false)?;

    info!(
        url = %config.supabase.url,
        schema = %config.client.schema,
        timeout_seconds = config.client.timeout_seconds,
        "config loaded"
    );

    let client = client::shared_with(move || Ok(config))?;
    let bugs = client.table::<Bugs>();

    match args.command {
        Command::Check => {
            println!("✓ config ok: {} (schema {})", client.rest_url(), client.schema());
        }
        Command::Ping => {
            client.ping().await?;
            println!("✓ reachable: {}", client.rest_url());
        }
        Command::List(filter) => {
            let rows = bugs.select(&Query::from(&filter)).await?;
            info!(count = rows.len(), "listed bugs");
            print_rows(&rows, args.json)?;
        }
        Command::Show { id } => {
            let bug = bugs.get(&id).await?.ok_or_else(|| AppError::NotFound(format!("bug {id}")))?;
            print_one(&bug, args.json)?;
        }
        Command::Create(new_bug) => {
            let bug = bugs.insert(&new_bug).await?;
            info!(id = %bug.id, "bug created");
            print_one(&bug, args.json)?;
        }
        Command::Update { id, patch } => {
            let bug = bugs
                .update(&id, &patch)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("bug {id}")))?;
            info!(id = %bug.id, "bug updated");
            print_one(&bug, args.json)?;
        }
        Command::Delete { id } => {
            if !bugs.delete(&id).await? {
                return Err(AppError::NotFound(format!("bug {id}")));
            }
            info!(%id, "bug deleted");
            println!("✓ deleted {id}");
        }
    }

    Ok(())
}

fn print_rows(rows: &[Bug], json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows).map_err(std::io::Error::from)?);
    } else {
        for bug in rows {
            println!("{}", summary_line(bug));
        }
    }
    Ok(())
}

fn print_one(bug: &Bug, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(bug).map_err(std::io::Error::from)?);
        return Ok(());
    }
    println!("{}", summary_line(bug));
    if let Some(description) = &bug.description {
        println!("  {description}");
    }
    println!(
        "  assigned_to: {}  reporter: {}",
        bug.assigned_to.as_deref().unwrap_or("-"),
        bug.reporter.as_deref().unwrap_or("-")
    );
    println!("  created: {}  updated: {}", bug.created_at.to_rfc3339(), bug.updated_at.to_rfc3339());
    Ok(())
}

fn summary_line(bug: &Bug) -> String {
    format!("{}  {:<11}  {:<8}  {}", bug.id, bug.status.as_str(), bug.priority.as_str(), bug.title)
}
