// src/store/users.rs
// =============================================================================
// The steam_users table: one row per Steam ID the crawler has visited.
//
// The `id` column only records insertion order; `steam_id` is the real key
// and carries a UNIQUE constraint, so INSERT OR IGNORE gives us
// insert-if-absent for free.
// =============================================================================

use std::path::Path;

use rusqlite::{params, Connection};

use super::InsertOutcome;
use crate::crawl::UserSink;
use crate::errors::StoreError;

pub struct UserStore {
    conn: Connection,
}

impl UserStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn insert_if_absent(&self, steam_id: &str) -> Result<InsertOutcome, StoreError> {
        let changes = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO steam_users (steam_id) VALUES (?1)",
                params![steam_id],
            )
            .map_err(|e| StoreError::query(e.to_string()))?;
        Ok(InsertOutcome::from_changes(changes))
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM steam_users", [], |row| row.get(0))
            .map_err(|e| StoreError::query(e.to_string()))?;
        Ok(count as usize)
    }

    /// Every stored Steam ID, oldest first.
    pub fn all_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT steam_id FROM steam_users ORDER BY id")
            .map_err(|e| StoreError::query(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::query(e.to_string()))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(|e| StoreError::query(e.to_string()))?);
        }
        Ok(ids)
    }
}

impl UserSink for UserStore {
    fn insert_if_absent(&mut self, steam_id: &str) -> Result<InsertOutcome, StoreError> {
        UserStore::insert_if_absent(self, steam_id)
    }
}

fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS steam_users (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            steam_id TEXT UNIQUE
        );
        "#,
    )
    .map_err(|e| StoreError::schema(e.to_string()))
}
