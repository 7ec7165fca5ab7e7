// src/habits/mod.rs
// =============================================================================
// This module enriches gathered users with their game libraries.
//
// For every user the crawler collected, it fetches the games they own, looks
// each game up in the store, and writes one buying_habits row per game.
//
// It is resumable: users that already have rows are skipped, so an
// interrupted run can simply be started again.
// =============================================================================

mod enrich;

pub use enrich::{EnrichReport, Enricher};

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::steam::{AppDetails, OwnedGame};

/// Where libraries and store details come from.
#[async_trait]
pub trait LibrarySource {
    async fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>, FetchError>;

    async fn app_details(&self, app_id: u64) -> Result<Option<AppDetails>, FetchError>;
}
