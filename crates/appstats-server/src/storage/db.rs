//! Connection pool handle for the analytics database.

use sqlx::AnyPool;
use tracing::info;

use appstats_core::config::DatabaseConfig;
use appstats_core::db::{DatabaseError, open_pool};

/// Store accessor. Cheap to clone; all clones share one bounded pool.
#[derive(Clone)]
pub struct AnalyticsDatabase {
    pool: AnyPool,
}

impl AnalyticsDatabase {
    /// Open the pool described by `config` and verify the database answers.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .connection_url()
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        let db = Self::connect(&url, config.max_connections).await?;
        info!(url = %config.redacted_url(), "Analytics database opened");
        Ok(db)
    }

    /// Open a pool from a raw connection URL.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = open_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
