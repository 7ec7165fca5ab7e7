// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands, one per stage of the data collection:
// - gather: crawl the friend graph into steam_users.db
// - habits: enrich gathered users with their libraries into buy_habits.db
// - stats:  print what the two databases currently hold
//
// The API key can be passed as a flag, through STEAM_API_KEY, or typed in
// when prompted.
// =============================================================================

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "steam-gatherer",
    version = "0.1.0",
    about = "Collects Steam friend-graph and library data into SQLite",
    long_about = "steam-gatherer walks the Steam friend graph breadth-first from a seed user, \
                  stores every user it visits, and can then enrich those users with the games \
                  they own for later analysis."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the friend graph starting from one Steam ID
    ///
    /// Example: steam-gatherer gather 76561197960287930 --limit 500
    Gather {
        /// SteamID64 to start from (prompted for if omitted)
        seed: Option<String>,

        /// Maximum number of distinct users to visit
        #[arg(long, default_value = "3000")]
        limit: NonZeroUsize,

        /// SQLite file receiving the steam_users table
        #[arg(long, default_value = "steam_users.db")]
        db: PathBuf,

        #[command(flatten)]
        api: ApiArgs,

        /// Print a JSON summary when done
        #[arg(long)]
        json: bool,
    },

    /// Fetch owned games and store details for gathered users
    ///
    /// Example: steam-gatherer habits --steam-id 76561197960287930
    Habits {
        /// Only enrich this one user instead of everyone in the users database
        #[arg(long)]
        steam_id: Option<String>,

        /// SQLite file holding the steam_users table
        #[arg(long, default_value = "steam_users.db")]
        users_db: PathBuf,

        /// SQLite file receiving the buying_habits table
        #[arg(long, default_value = "buy_habits.db")]
        habits_db: PathBuf,

        #[command(flatten)]
        api: ApiArgs,

        /// Print a JSON summary when done
        #[arg(long)]
        json: bool,
    },

    /// Show how much data has been collected so far
    Stats {
        #[arg(long, default_value = "steam_users.db")]
        users_db: PathBuf,

        #[arg(long, default_value = "buy_habits.db")]
        habits_db: PathBuf,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Settings shared by every subcommand that calls the Steam API.
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Steam Web API key (prompted for if omitted)
    #[arg(long, env = "STEAM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Pause between users, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Override the Web API host
    #[arg(long, hide = true)]
    pub api_base: Option<String>,

    /// Override the store host
    #[arg(long, hide = true)]
    pub store_base: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_defaults() {
        let cli = Cli::try_parse_from(["steam-gatherer", "gather", "123"]).unwrap();
        match cli.command {
            Commands::Gather {
                seed, limit, db, api, ..
            } => {
                assert_eq!(seed.as_deref(), Some("123"));
                assert_eq!(limit.get(), 3000);
                assert_eq!(db, PathBuf::from("steam_users.db"));
                assert_eq!(api.delay_ms, 1000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let result = Cli::try_parse_from(["steam-gatherer", "gather", "123", "--limit", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_habits_single_user() {
        let cli = Cli::try_parse_from([
            "steam-gatherer",
            "habits",
            "--steam-id",
            "42",
            "--api-key",
            "k",
        ])
        .unwrap();
        match cli.command {
            Commands::Habits { steam_id, api, .. } => {
                assert_eq!(steam_id.as_deref(), Some("42"));
                assert_eq!(api.api_key.as_deref(), Some("k"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
