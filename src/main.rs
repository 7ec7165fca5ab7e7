// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG controls verbosity)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = finished, 2 = setup error)
//
// Progress goes to stdout with println!; warnings and diagnostics go through
// tracing to stderr.
// =============================================================================

mod cli;
mod crawl;
mod errors;
mod habits;
mod steam;
mod store;

use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{ApiArgs, Cli, Commands};
use crawl::Crawler;
use habits::Enricher;
use steam::SteamClient;
use store::{HabitStore, UserStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "steam_gatherer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Gather {
            seed,
            limit,
            db,
            api,
            json,
        } => handle_gather(seed, limit, &db, api, json).await,
        Commands::Habits {
            steam_id,
            users_db,
            habits_db,
            api,
            json,
        } => handle_habits(steam_id, &users_db, &habits_db, api, json).await,
        Commands::Stats {
            users_db,
            habits_db,
            json,
        } => handle_stats(&users_db, &habits_db, json),
    }
}

// Handles the 'gather' subcommand
async fn handle_gather(
    seed: Option<String>,
    limit: NonZeroUsize,
    db: &Path,
    mut api: ApiArgs,
    json: bool,
) -> Result<i32> {
    let api_key = resolve(api.api_key.take(), "Please enter your Steam API Key: ")?;
    let seed = resolve(seed, "Please Enter Your Starting Steam ID: ")?;

    let store = UserStore::open(db)
        .with_context(|| format!("could not open users database {}", db.display()))?;
    let client = build_client(api_key, &api)?;

    let mut crawler = Crawler::new(client, store, Duration::from_millis(api.delay_ms));
    let report = crawler.run(&seed, limit).await;

    if json {
        print_json(&report)?;
    } else {
        println!(
            "Visited {} user(s), {} new, {} already stored",
            report.visited.len(),
            report.inserted,
            report.already_present
        );
        println!("{} ID(s) still queued", crawler.queued());
        if let Ok(total) = crawler.sink().count() {
            println!("{} user(s) in {}", total, db.display());
        }
    }

    println!("Done!");
    Ok(0)
}

// Handles the 'habits' subcommand
async fn handle_habits(
    steam_id: Option<String>,
    users_db: &Path,
    habits_db: &Path,
    mut api: ApiArgs,
    json: bool,
) -> Result<i32> {
    let api_key = resolve(api.api_key.take(), "Please enter your Steam API Key: ")?;

    let users = match steam_id {
        Some(id) => {
            println!("Using specific Steam ID: {}", id);
            vec![id]
        }
        None => {
            let store = UserStore::open(users_db)
                .with_context(|| format!("could not open users database {}", users_db.display()))?;
            let ids = store.all_ids()?;
            println!("Fetched {} Steam IDs from the database.", ids.len());
            ids
        }
    };

    let store = HabitStore::open(habits_db)
        .with_context(|| format!("could not open habits database {}", habits_db.display()))?;
    let client = build_client(api_key, &api)?;

    let mut enricher = Enricher::new(client, store, Duration::from_millis(api.delay_ms));
    let report = enricher.run(&users).await;

    if json {
        print_json(&report)?;
    } else if let Ok(rows) = enricher.store().row_count() {
        println!("{} row(s) in {}", rows, habits_db.display());
    }

    println!(
        "Finished processing. Total Steam API calls made: {}",
        report.store_calls
    );
    Ok(0)
}

#[derive(Debug, Serialize)]
struct Stats {
    users: Option<usize>,
    users_with_habits: Option<usize>,
    habit_rows: Option<usize>,
}

// Handles the 'stats' subcommand
fn handle_stats(users_db: &Path, habits_db: &Path, json: bool) -> Result<i32> {
    let mut stats = Stats {
        users: None,
        users_with_habits: None,
        habit_rows: None,
    };

    // Don't create empty databases just to count them
    if users_db.exists() {
        stats.users = Some(UserStore::open(users_db)?.count()?);
    }
    if habits_db.exists() {
        let habits = HabitStore::open(habits_db)?;
        stats.users_with_habits = Some(habits.user_count()?);
        stats.habit_rows = Some(habits.row_count()?);
    }

    if json {
        print_json(&stats)?;
        return Ok(0);
    }

    match stats.users {
        Some(n) => println!("👥 Users gathered:   {}", n),
        None => println!("👥 Users gathered:   (no database at {})", users_db.display()),
    }
    if let (Some(users), Some(rows)) = (stats.users_with_habits, stats.habit_rows) {
        println!("🎮 Users with games: {}", users);
        println!("📋 Habit rows:       {}", rows);
    }

    Ok(0)
}

fn build_client(api_key: String, api: &ApiArgs) -> Result<SteamClient> {
    let mut client = SteamClient::new(api_key).context("could not build HTTP client")?;
    if let Some(base) = &api.api_base {
        client = client.with_api_base(base);
    }
    if let Some(base) = &api.store_base {
        client = client.with_store_base(base);
    }
    Ok(client)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    println!("{}", json_output);
    Ok(())
}

// Uses the given value, or asks for one on stdin
fn resolve(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let line = line.trim();
    if line.is_empty() {
        bail!("no value entered for: {}", prompt.trim_end_matches(": "));
    }
    Ok(line.to_string())
}
