// src/errors.rs
// =============================================================================
// Error types shared by the store and the Steam client.
//
// The binary itself uses anyhow (see main.rs), but the pieces the crawler
// talks to return typed errors so the crawler can log them and keep going.
// =============================================================================

use thiserror::Error;

/// Anything that can go wrong while talking to SQLite.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("query error: {0}")]
    Query(String),
}

impl StoreError {
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        StoreError::Connection(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        StoreError::Schema(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        StoreError::Query(msg.into())
    }
}

/// Why a Steam API call did not produce usable data.
///
/// The crawler collapses every variant to "no friends"; the variants exist
/// so the log line says which one it was.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 403 from the Web API, a bad or revoked key
    #[error("unauthorized (HTTP {0}), check the API key")]
    Unauthorized(u16),
    /// Any other non-2xx status; private profiles come back as 401
    #[error("HTTP {0}")]
    Status(u16),
    /// Network-level failure: DNS, connect, timeout, ...
    #[error("request failed: {0}")]
    Transport(String),
    /// 2xx but the body was not what we expected
    #[error("unexpected payload: {0}")]
    MalformedPayload(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Maps a non-success status code to the right variant.
    pub fn from_status(code: u16) -> Self {
        match code {
            403 => FetchError::Unauthorized(code),
            other => FetchError::Status(other),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FetchError::MalformedPayload(error.to_string())
        } else if let Some(status) = error.status() {
            FetchError::from_status(status.as_u16())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::MalformedPayload(error.to_string())
    }
}
