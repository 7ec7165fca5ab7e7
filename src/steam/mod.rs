// src/steam/mod.rs
// =============================================================================
// This module talks to Steam.
//
// Endpoints used:
// - ISteamUser/GetFriendList/v1       (friend graph, used by the crawler)
// - IPlayerService/GetOwnedGames/v1   (a user's library, used by `habits`)
// - store.steampowered.com/api/appdetails (price, genres, ... per game)
//
// The Web API endpoints need an API key; the store endpoint doesn't.
// Every call is a plain GET returning JSON.
// =============================================================================

mod client;
mod friends;
mod library;

pub use client::SteamClient;
pub use library::{AppDetails, OwnedGame};
