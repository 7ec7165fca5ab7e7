// src/steam/library.rs
// =============================================================================
// Owned games and store details, used by the enrichment pass.
//
// GetOwnedGames example:
//   {"response": {"game_count": 1, "games": [
//       {"appid": 10, "name": "Counter-Strike", "playtime_forever": 32}
//   ]}}
//
// appdetails example (keyed by the app id as a string):
//   {"10": {"success": true, "data": {"name": "...", "genres": [...], ...}}}
//
// Store fields are all optional in practice; anything missing becomes None
// or an empty list rather than an error.
// =============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::SteamClient;
use crate::errors::FetchError;
use crate::habits::LibrarySource;

/// One entry from a user's library.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwnedGame {
    pub appid: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// Minutes
    #[serde(default)]
    pub playtime_forever: u64,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    response: Option<OwnedGames>,
}

#[derive(Debug, Deserialize)]
struct OwnedGames {
    #[serde(default)]
    games: Vec<OwnedGame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Description {
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceOverview {
    /// Cents
    #[serde(rename = "final", default)]
    pub final_price: i64,
    #[serde(default)]
    pub discount_percent: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDate {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metacritic {
    pub score: Option<i64>,
}

/// The `data` object of an appdetails response, trimmed to what we store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppDetails {
    pub name: Option<String>,
    pub genres: Vec<Description>,
    pub is_free: bool,
    pub price_overview: Option<PriceOverview>,
    pub release_date: Option<ReleaseDate>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub metacritic: Option<Metacritic>,
    /// e.g. {"windows": true, "mac": false, "linux": false}
    pub platforms: Option<serde_json::Map<String, serde_json::Value>>,
    /// Kept as raw JSON, they go straight into the tags column
    pub categories: Vec<serde_json::Value>,
    pub review_score: Option<f64>,
    pub reviews_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AppDetailsEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<AppDetails>,
}

impl SteamClient {
    /// Every game in the user's library, free-to-play titles included.
    pub async fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>, FetchError> {
        let url = self.api_url(
            "IPlayerService/GetOwnedGames/v1/",
            &[
                ("steamid", steam_id),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
            ],
        )?;
        let body = self.get_text(url).await?;
        parse_owned_games(&body)
    }

    /// Store details for one app, or None when the store has nothing for it
    /// (delisted, region-locked, ...).
    pub async fn app_details(&self, app_id: u64) -> Result<Option<AppDetails>, FetchError> {
        let app_id = app_id.to_string();
        let url = self.store_url("api/appdetails", &[("appids", app_id.as_str())])?;
        let body = self.get_text(url).await?;
        parse_app_details(&body, &app_id)
    }
}

#[async_trait]
impl LibrarySource for SteamClient {
    async fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>, FetchError> {
        SteamClient::owned_games(self, steam_id).await
    }

    async fn app_details(&self, app_id: u64) -> Result<Option<AppDetails>, FetchError> {
        SteamClient::app_details(self, app_id).await
    }
}

fn parse_owned_games(body: &str) -> Result<Vec<OwnedGame>, FetchError> {
    let parsed: OwnedGamesResponse = serde_json::from_str(body)?;
    Ok(parsed.response.map(|r| r.games).unwrap_or_default())
}

fn parse_app_details(body: &str, app_id: &str) -> Result<Option<AppDetails>, FetchError> {
    // The store answers a bare `null` for unknown ids
    let mut parsed: Option<HashMap<String, AppDetailsEnvelope>> = serde_json::from_str(body)?;

    let envelope = parsed.as_mut().and_then(|map| map.remove(app_id));
    Ok(match envelope {
        Some(AppDetailsEnvelope {
            success: true,
            data,
        }) => data,
        _ => None,
    })
}
