//! Shared database types and utilities.
//!
//! Provides `DatabaseError`, `unix_timestamp()`, and pool creation for the
//! server's storage layer. Pools go through sqlx's `Any` driver so the same
//! queries run against Postgres in production and in-memory `SQLite` in tests.

use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{AnyPool, Connection};
use tracing::info;

/// Database errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DatabaseError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Connection(e.to_string()),
            _ => Self::Query(e.to_string()),
        }
    }
}

/// Open a bounded connection pool and verify connectivity.
///
/// `url` selects the driver (`postgres://...` or `sqlite:...`). The pool
/// connects eagerly and the connection is pinged, so an unreachable database
/// fails here instead of on the first request.
pub async fn open_pool(url: &str, max_connections: u32) -> Result<AnyPool, DatabaseError> {
    if max_connections == 0 {
        return Err(DatabaseError::Connection(
            "max_connections must be at least 1".to_string(),
        ));
    }

    install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    ping(&pool).await?;

    info!(max_connections, "Database pool opened");

    Ok(pool)
}

/// Round-trip a ping on one pooled connection.
pub async fn ping(pool: &AnyPool) -> Result<(), DatabaseError> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;
    conn.ping()
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))
}

/// Returns the current time as a Unix timestamp (seconds since epoch).
#[allow(clippy::cast_possible_wrap)]
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
