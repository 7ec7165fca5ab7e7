// src/store/habits.rs
// =============================================================================
// The buying_habits table: one row per (user, owned game) pair, enriched
// with store details.
//
// No uniqueness constraint here. Resumption works per user: if a user
// already has any rows, the enrichment pass skips them (see habits/enrich.rs).
// A user's rows are written inside one transaction (HabitBatch), so a user
// is either fully stored or not stored at all.
// =============================================================================

use std::path::Path;

use rusqlite::{params, Connection, Transaction};

use crate::errors::StoreError;

/// One row of buying_habits, as written by the enrichment pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitRow {
    pub steam_id: String,
    pub game_name: Option<String>,
    pub app_id: u64,
    /// Hours, not minutes
    pub playtime: f64,
    /// JSON array of genre descriptions
    pub genres: String,
    pub on_sale: bool,
    pub price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub release_date: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub metacritic_score: Option<i64>,
    pub platforms: Option<String>,
    pub currency: String,
    pub steam_rating: Option<f64>,
    pub number_of_reviews: Option<i64>,
    /// JSON array of store categories
    pub tags: String,
}

pub struct HabitStore {
    conn: Connection,
}

impl HabitStore {
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

    pub fn has_habits(&self, steam_id: &str) -> Result<bool, StoreError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM buying_habits WHERE steam_id = ?1",
                params![steam_id],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::query(e.to_string()))?;
        Ok(count > 0)
    }

    /// Starts writing one user's rows. Nothing is visible until
    /// `HabitBatch::commit`; dropping the batch rolls everything back.
    pub fn begin_user(&mut self) -> Result<HabitBatch<'_>, StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::query(e.to_string()))?;
        Ok(HabitBatch { tx })
    }

    pub fn row_count(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(*) FROM buying_habits")
    }

    pub fn user_count(&self) -> Result<usize, StoreError> {
        self.count("SELECT COUNT(DISTINCT steam_id) FROM buying_habits")
    }

    fn count(&self, sql: &str) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| StoreError::query(e.to_string()))?;
        Ok(count as usize)
    }
}

/// The open transaction for one user's rows.
pub struct HabitBatch<'a> {
    tx: Transaction<'a>,
}

impl HabitBatch<'_> {
    pub fn insert(&self, row: &HabitRow) -> Result<i64, StoreError> {
        self.tx
            .execute(
                "INSERT INTO buying_habits (steam_id, game_name, app_id, playtime, genres, on_sale, \
                 price, discount_percentage, release_date, developer, publisher, metacritic_score, \
                 platforms, currency, steam_rating, number_of_reviews, tags) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    row.steam_id,
                    row.game_name,
                    row.app_id as i64,
                    row.playtime,
                    row.genres,
                    row.on_sale,
                    row.price,
                    row.discount_percentage,
                    row.release_date,
                    row.developer,
                    row.publisher,
                    row.metacritic_score,
                    row.platforms,
                    row.currency,
                    row.steam_rating,
                    row.number_of_reviews,
                    row.tags,
                ],
            )
            .map_err(|e| StoreError::query(e.to_string()))?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .map_err(|e| StoreError::query(e.to_string()))
    }
}

fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS buying_habits (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            steam_id            TEXT NOT NULL,
            game_name           TEXT,
            app_id              INTEGER,
            playtime            REAL,
            genres              TEXT,
            on_sale             BOOLEAN,
            price               REAL,
            discount_percentage REAL,
            release_date        TEXT,
            developer           TEXT,
            publisher           TEXT,
            metacritic_score    INTEGER,
            platforms           TEXT,
            currency            TEXT,
            steam_rating        REAL,
            number_of_reviews   INTEGER,
            tags                TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_habits_steam_id ON buying_habits(steam_id);
        "#,
    )
    .map_err(|e| StoreError::schema(e.to_string()))
}
