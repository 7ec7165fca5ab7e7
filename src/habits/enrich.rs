// src/habits/enrich.rs
// =============================================================================
// The per-user, per-game enrichment loop.
//
// For each user:
// 1. Skip if buying_habits already has rows for them
// 2. Fetch the games they own
// 3. For each game, fetch store details and insert a row
// 4. Commit the user's rows in one go
// 5. Wait before moving on to the next user
//
// A run stopped halfway through a user leaves none of that user's rows, so
// the next run picks them up again instead of skipping a partial library.
//
// Anything that goes wrong for one game or one user is printed and skipped;
// the loop always reaches the end of the user list.
// =============================================================================

use std::time::Duration;

use serde::Serialize;

use super::LibrarySource;
use crate::steam::{AppDetails, OwnedGame};
use crate::store::{HabitBatch, HabitRow, HabitStore};

/// Playtimes above this many hours are bogus (idlers, counter overflow)
const MAX_PLAYTIME_HOURS: f64 = 100_000.0;

/// Summary of one enrichment run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichReport {
    pub users_processed: usize,
    pub users_skipped: usize,
    pub rows_inserted: usize,
    pub games_skipped: usize,
    /// Store lookups made, one per game considered
    pub store_calls: usize,
}

pub struct Enricher<L> {
    source: L,
    store: HabitStore,
    delay: Duration,
}

impl<L: LibrarySource> Enricher<L> {
    pub fn new(source: L, store: HabitStore, delay: Duration) -> Self {
        Self {
            source,
            store,
            delay,
        }
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub async fn run(&mut self, users: &[String]) -> EnrichReport {
        let mut report = EnrichReport::default();

        for (index, steam_id) in users.iter().enumerate() {
            println!("[{}] Processing Steam ID: {}", index + 1, steam_id);

            match self.store.has_habits(steam_id) {
                Ok(true) => {
                    println!("Buying habits for Steam ID {} already exist, skipping...", steam_id);
                    report.users_skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(steam_id = %steam_id, error = %e, "could not check existing habits");
                    report.users_skipped += 1;
                    continue;
                }
            }

            match self.source.owned_games(steam_id).await {
                Ok(games) if games.is_empty() => {
                    println!("No games found for Steam ID {}", steam_id);
                }
                Ok(games) => {
                    println!("Found {} games for Steam ID: {}", games.len(), steam_id);
                    self.enrich_user(steam_id, &games, &mut report).await;
                }
                Err(e) => {
                    println!("Failed to fetch games for Steam ID {}: {}", steam_id, e);
                }
            }

            report.users_processed += 1;
            tokio::time::sleep(self.delay).await;
        }

        report
    }

    async fn enrich_user(&mut self, steam_id: &str, games: &[OwnedGame], report: &mut EnrichReport) {
        let batch = match self.store.begin_user() {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(steam_id = %steam_id, error = %e, "could not start habits transaction");
                return;
            }
        };

        let mut saved = 0;
        for game in games {
            if enrich_game(&self.source, &batch, steam_id, game, report).await {
                saved += 1;
            }
        }

        match batch.commit() {
            Ok(()) => {
                report.rows_inserted += saved;
                println!("Updated buying habits for Steam ID: {}", steam_id);
            }
            Err(e) => {
                tracing::warn!(steam_id = %steam_id, error = %e, "failed to commit habit rows");
            }
        }
    }
}

/// Looks one game up and writes its row into the user's batch.
/// Returns whether a row was written.
async fn enrich_game<L: LibrarySource>(
    source: &L,
    batch: &HabitBatch<'_>,
    steam_id: &str,
    game: &OwnedGame,
    report: &mut EnrichReport,
) -> bool {
    let label = game.name.as_deref().unwrap_or("<unnamed>");
    let playtime = game.playtime_forever as f64 / 60.0;

    if playtime > MAX_PLAYTIME_HOURS {
        println!(
            "WARNING: High playtime for {} ({:.2} hours) - skipping...",
            label, playtime
        );
        report.games_skipped += 1;
        return false;
    }

    report.store_calls += 1;
    let details = match source.app_details(game.appid).await {
        Ok(Some(details)) => details,
        Ok(None) => {
            println!(
                "Error for {}: no store data for appid {}. Skipping...",
                label, game.appid
            );
            report.games_skipped += 1;
            return false;
        }
        Err(e) => {
            println!("Error for {}: {}. Skipping...", label, e);
            report.games_skipped += 1;
            return false;
        }
    };

    let row = build_row(steam_id, game, &details);
    match batch.insert(&row) {
        Ok(_) => {
            println!("Inserted data for {} (appid: {})", label, game.appid);
            true
        }
        Err(e) => {
            tracing::warn!(steam_id = %steam_id, app_id = game.appid, error = %e, "failed to save habit row");
            report.games_skipped += 1;
            false
        }
    }
}

/// Flattens one owned game plus its store details into a table row.
fn build_row(steam_id: &str, game: &OwnedGame, details: &AppDetails) -> HabitRow {
    let genres: Vec<String> = details
        .genres
        .iter()
        .map(|g| g.description.clone())
        .collect();

    let price = details.price_overview.clone().unwrap_or_default();

    let platforms = details
        .platforms
        .as_ref()
        .map(|p| p.keys().cloned().collect::<Vec<_>>().join(", "));

    HabitRow {
        steam_id: steam_id.to_string(),
        game_name: game.name.clone(),
        app_id: game.appid,
        playtime: game.playtime_forever as f64 / 60.0,
        genres: serde_json::Value::from(genres).to_string(),
        on_sale: details.is_free,
        price: Some(price.final_price as f64 / 100.0),
        discount_percentage: Some(price.discount_percent as f64),
        release_date: details.release_date.as_ref().and_then(|r| r.date.clone()),
        developer: details.developers.first().cloned(),
        publisher: details.publishers.first().cloned(),
        metacritic_score: details.metacritic.as_ref().and_then(|m| m.score),
        platforms,
        currency: "USD".to_string(),
        steam_rating: details.review_score,
        number_of_reviews: details.reviews_count,
        tags: serde_json::Value::Array(details.categories.clone()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeLibrary {
        libraries: HashMap<String, Vec<OwnedGame>>,
        details: HashMap<u64, AppDetails>,
        owned_calls: AtomicUsize,
        // While set, the lookup for this app never answers
        hang_on: Option<u64>,
        hanging: AtomicBool,
    }

    impl FakeLibrary {
        fn owns(mut self, steam_id: &str, games: Vec<OwnedGame>) -> Self {
            self.libraries.insert(steam_id.to_string(), games);
            self
        }

        fn listed(mut self, app_id: u64, details: AppDetails) -> Self {
            self.details.insert(app_id, details);
            self
        }

        fn hangs_on(mut self, app_id: u64) -> Self {
            self.hang_on = Some(app_id);
            self.hanging = AtomicBool::new(true);
            self
        }
    }

    #[async_trait]
    impl LibrarySource for FakeLibrary {
        async fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>, FetchError> {
            self.owned_calls.fetch_add(1, Ordering::SeqCst);
            self.libraries
                .get(steam_id)
                .cloned()
                .ok_or(FetchError::Status(401))
        }

        async fn app_details(&self, app_id: u64) -> Result<Option<AppDetails>, FetchError> {
            if self.hang_on == Some(app_id) && self.hanging.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            Ok(self.details.get(&app_id).cloned())
        }
    }

    fn game(appid: u64, minutes: u64) -> OwnedGame {
        OwnedGame {
            appid,
            name: Some(format!("Game {appid}")),
            playtime_forever: minutes,
        }
    }

    fn details() -> AppDetails {
        serde_json::from_value(serde_json::json!({
            "genres": [{"id": "1", "description": "Action"}],
            "price_overview": {"currency": "USD", "final": 1999, "discount_percent": 50},
            "developers": ["Valve", "Hidden Path"]
        }))
        .unwrap()
    }

    fn enricher(library: FakeLibrary) -> Enricher<FakeLibrary> {
        Enricher::new(library, HabitStore::open_in_memory().unwrap(), Duration::ZERO)
    }

    #[test]
    fn test_build_row_flattens_details() {
        let row = build_row("7", &game(10, 90), &details());

        assert_eq!(row.steam_id, "7");
        assert_eq!(row.playtime, 1.5);
        assert_eq!(row.genres, r#"["Action"]"#);
        assert_eq!(row.price, Some(19.99));
        assert_eq!(row.discount_percentage, Some(50.0));
        assert_eq!(row.developer.as_deref(), Some("Valve"));
        assert_eq!(row.publisher, None);
        assert_eq!(row.currency, "USD");
        assert_eq!(row.tags, "[]");
    }

    #[test]
    fn test_build_row_without_price_is_zero() {
        let row = build_row("7", &game(10, 0), &AppDetails::default());
        assert_eq!(row.price, Some(0.0));
        assert_eq!(row.discount_percentage, Some(0.0));
    }

    #[tokio::test]
    async fn test_inserts_one_row_per_listed_game() {
        let library = FakeLibrary::default()
            .owns("1", vec![game(10, 60), game(20, 0), game(30, 5)])
            .listed(10, details())
            .listed(20, details());
        let mut enricher = enricher(library);

        let report = enricher.run(&["1".to_string()]).await;

        // appid 30 has no store data
        assert_eq!(report.rows_inserted, 2);
        assert_eq!(report.games_skipped, 1);
        assert_eq!(report.store_calls, 3);
        assert_eq!(enricher.store().row_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_skips_absurd_playtime_without_store_call() {
        let library = FakeLibrary::default()
            .owns("1", vec![game(10, 6_000_001 * 60)])
            .listed(10, details());
        let mut enricher = enricher(library);

        let report = enricher.run(&["1".to_string()]).await;

        assert_eq!(report.rows_inserted, 0);
        assert_eq!(report.store_calls, 0);
    }

    #[tokio::test]
    async fn test_existing_users_are_skipped() {
        let library = FakeLibrary::default()
            .owns("1", vec![game(10, 60)])
            .listed(10, details());
        let mut enricher = enricher(library);
        let users = vec!["1".to_string()];

        let first = enricher.run(&users).await;
        let second = enricher.run(&users).await;

        assert_eq!(first.users_processed, 1);
        assert_eq!(second.users_skipped, 1);
        assert_eq!(enricher.source.owned_calls.load(Ordering::SeqCst), 1);
        assert_eq!(enricher.store().row_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_library_fetch_moves_on() {
        let library = FakeLibrary::default()
            .owns("2", vec![game(10, 60)])
            .listed(10, details());
        let mut enricher = enricher(library);

        let report = enricher.run(&["1".to_string(), "2".to_string()]).await;

        assert_eq!(report.users_processed, 2);
        assert_eq!(report.rows_inserted, 1);
        assert!(enricher.store().has_habits("2").unwrap());
        assert!(!enricher.store().has_habits("1").unwrap());
    }

    #[tokio::test]
    async fn test_interrupted_user_is_redone_on_next_run() {
        let library = FakeLibrary::default()
            .owns("1", vec![game(10, 60), game(20, 60), game(30, 60)])
            .listed(10, details())
            .listed(20, details())
            .listed(30, details())
            .hangs_on(20);
        let mut enricher = enricher(library);
        let users = vec!["1".to_string()];

        // Game 10 is written, then the run is cut off while waiting on game 20
        let interrupted =
            tokio::time::timeout(Duration::from_millis(50), enricher.run(&users)).await;
        assert!(interrupted.is_err());
        assert_eq!(enricher.store().row_count().unwrap(), 0);
        assert!(!enricher.store().has_habits("1").unwrap());

        enricher.source.hanging.store(false, Ordering::SeqCst);
        let report = enricher.run(&users).await;

        assert_eq!(report.users_skipped, 0);
        assert_eq!(report.rows_inserted, 3);
        assert_eq!(enricher.store().row_count().unwrap(), 3);
    }
}
