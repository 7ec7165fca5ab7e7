// src/crawl/frontier.rs
// =============================================================================
// This module implements the friend-graph crawl with a breadth-first approach.
//
// How it works:
// 1. Start with the seed Steam ID in a queue
// 2. Pop the next ID; skip it if we've already visited it
// 3. Mark it visited and save it to the sink
// 4. Fetch its friend list and push every friend onto the back of the queue
// 5. Wait a little, then repeat until the queue is empty or we hit the limit
//
// Duplicates are allowed into the queue and thrown away when they come back
// out. The visited set is only touched at dequeue time, so each user is
// saved at most once per run no matter how many friends point at them.
//
// Failures never stop the crawl:
// - a failed save is logged, and we still expand the user's friends
// - a failed friend fetch is logged and counts as "no friends"
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Serialize;

use super::{FriendSource, UserSink};
use crate::store::InsertOutcome;

/// Why a crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Visited as many users as we were allowed to
    LimitReached,
    /// Ran out of users to visit before hitting the limit
    QueueExhausted,
}

/// Summary of one crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Steam IDs in the order they were visited
    pub visited: Vec<String>,
    pub inserted: usize,
    pub already_present: usize,
    pub store_failures: usize,
    pub fetch_failures: usize,
    pub termination: Termination,
}

/// A single crawl session: owns the frontier, the visited set, and the
/// two collaborators it reads from and writes to.
pub struct Crawler<F, S> {
    source: F,
    sink: S,
    delay: Duration,
    queue: VecDeque<String>,
    visited: HashSet<String>,
}

impl<F, S> Crawler<F, S>
where
    F: FriendSource,
    S: UserSink,
{
    pub fn new(source: F, sink: S, delay: Duration) -> Self {
        Self {
            source,
            sink,
            delay,
            queue: VecDeque::new(),
            visited: HashSet::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// How many entries are waiting in the frontier, duplicates included.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Crawls outward from `seed` until `limit` distinct users have been
    /// visited or nobody is left to visit.
    ///
    /// Each call starts from scratch: the queue and visited set are rebuilt
    /// from the seed. Only the sink carries over between runs.
    pub async fn run(&mut self, seed: &str, limit: NonZeroUsize) -> CrawlReport {
        let limit = limit.get();

        self.queue.clear();
        self.visited.clear();
        self.queue.push_back(seed.to_string());

        let mut report = CrawlReport {
            visited: Vec::new(),
            inserted: 0,
            already_present: 0,
            store_failures: 0,
            fetch_failures: 0,
            termination: Termination::QueueExhausted,
        };

        while self.visited.len() < limit {
            let Some(current) = self.queue.pop_front() else {
                break;
            };

            // Already handled this one via another friend
            if self.visited.contains(&current) {
                continue;
            }

            self.visited.insert(current.clone());
            report.visited.push(current.clone());

            match self.sink.insert_if_absent(&current) {
                Ok(InsertOutcome::Inserted) => report.inserted += 1,
                Ok(InsertOutcome::AlreadyPresent) => report.already_present += 1,
                Err(e) => {
                    tracing::warn!(steam_id = %current, error = %e, "failed to save Steam ID");
                    report.store_failures += 1;
                }
            }

            println!("Collected: {} / {}", self.visited.len(), limit);

            match self.source.friends_of(&current).await {
                Ok(friends) => {
                    tracing::debug!(steam_id = %current, friends = friends.len(), "fetched friend list");
                    self.queue.extend(friends);
                }
                Err(e) if e.is_unauthorized() => {
                    tracing::error!(steam_id = %current, error = %e, "friend list request rejected");
                    report.fetch_failures += 1;
                }
                Err(e) => {
                    tracing::warn!(steam_id = %current, error = %e, "no friend list, treating as empty");
                    report.fetch_failures += 1;
                }
            }

            // Polite crawling: the Steam API rate-limits per key
            tokio::time::sleep(self.delay).await;
        }

        if self.visited.len() >= limit {
            report.termination = Termination::LimitReached;
        }

        tracing::info!(
            visited = report.visited.len(),
            inserted = report.inserted,
            termination = ?report.termination,
            "crawl finished"
        );

        report
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why VecDeque?
//    - push_back() adds to the end, pop_front() takes from the start
//    - Both are O(1), which is exactly what a FIFO queue needs
//    - Vec::remove(0) would shift every element on each pop
//
// 2. Why check "visited" when popping instead of when pushing?
//    - A user is marked visited the moment we process them, never earlier
//    - So the queue may hold the same ID several times; only the first
//      copy to reach the front does any work
//    - The final visited set and the saved rows come out the same either way
//
// 3. Why is the sink &mut but the source & ?
//    - Saving changes state, fetching doesn't
//    - The crawler is the only writer, so no locking is needed
//
// 4. Why `let ... else`?
//    - `let Some(current) = self.queue.pop_front() else { break; };`
//      binds the value or leaves the loop when the queue is empty
// -----------------------------------------------------------------------------
