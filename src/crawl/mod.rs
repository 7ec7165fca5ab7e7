// src/crawl/mod.rs
// =============================================================================
// This module handles crawling the Steam friend graph.
//
// Features:
// - Breadth-first traversal starting from one Steam ID
// - Bounded by a maximum number of distinct users
// - Every visited user is written to a durable sink exactly once
// - Polite crawling with a fixed delay between requests
//
// The crawler doesn't know about HTTP or SQLite. It talks to two traits:
// - FriendSource: "who are this user's friends?"
// - UserSink:     "remember this user"
// The real implementations live in steam/ and store/; the tests plug in
// in-memory fakes.
// =============================================================================

mod frontier;

pub use frontier::{CrawlReport, Crawler, Termination};

use async_trait::async_trait;

use crate::errors::{FetchError, StoreError};
use crate::store::InsertOutcome;

/// Something that can list a user's friends (the adjacency list).
#[async_trait]
pub trait FriendSource {
    async fn friends_of(&self, steam_id: &str) -> Result<Vec<String>, FetchError>;
}

/// Somewhere visited users get persisted, keyed by Steam ID.
pub trait UserSink {
    fn insert_if_absent(&mut self, steam_id: &str) -> Result<InsertOutcome, StoreError>;
}
