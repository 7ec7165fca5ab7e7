// src/store/mod.rs
// =============================================================================
// SQLite persistence for everything the gatherer collects.
//
// Two databases, one table each:
// - users:  steam_users     (filled by the crawler)
// - habits: buying_habits   (filled by the enrichment pass)
//
// Both are plain files so a run can be stopped at any time and restarted;
// every write is a single statement, so a killed process never leaves half
// a row behind.
// =============================================================================

mod habits;
mod users;

pub use habits::{HabitBatch, HabitRow, HabitStore};
pub use users::UserStore;

/// What happened to an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written
    Inserted,
    /// The key was already there, nothing changed
    AlreadyPresent,
}

impl InsertOutcome {
    // `execute` returns how many rows changed; INSERT OR IGNORE gives 0 on a hit
    pub(crate) fn from_changes(changes: usize) -> Self {
        if changes == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        }
    }
}
