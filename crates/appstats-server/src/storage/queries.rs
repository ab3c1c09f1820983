//! Database queries for the appstats server.

use appstats_core::db::{DatabaseError, unix_timestamp};
use tracing::debug;

use super::db::AnalyticsDatabase;
use super::models::{Application, Event};

impl AnalyticsDatabase {
    // =========================================================================
    // Application queries
    // =========================================================================

    /// Get an application by its key (exact, byte-for-byte match).
    ///
    /// Returns `DatabaseError::NotFound` when no row matches. Keys are assumed
    /// unique; if several rows match, the first one returned wins.
    pub async fn get_application(&self, app_key: &str) -> Result<Application, DatabaseError> {
        let result = sqlx::query_as::<_, Application>(
            "SELECT app_key, name, creation_time FROM application WHERE app_key = $1",
        )
        .bind(app_key)
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from)
        .and_then(|row| {
            row.ok_or_else(|| DatabaseError::NotFound(format!("Application {app_key}")))
        });

        observe("get_application", &result);
        result
    }

    /// List all applications, oldest first.
    pub async fn list_applications(&self) -> Result<Vec<Application>, DatabaseError> {
        let result = sqlx::query_as::<_, Application>(
            "SELECT app_key, name, creation_time FROM application ORDER BY creation_time, app_key",
        )
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from);

        observe("list_applications", &result);
        result
    }

    // =========================================================================
    // Event queries
    // =========================================================================

    /// Events for an application from the last `window_minutes`, newest first.
    ///
    /// The cutoff is taken from the clock at call time. A zero window only
    /// matches events stamped at or after that instant; there is no upper
    /// bound on the window.
    pub async fn events_for_application(
        &self,
        app_key: &str,
        window_minutes: u64,
    ) -> Result<Vec<Event>, DatabaseError> {
        let window_secs = i64::try_from(window_minutes)
            .unwrap_or(i64::MAX)
            .saturating_mul(60);
        let cutoff = unix_timestamp().saturating_sub(window_secs);

        debug!(app_key, window_minutes, cutoff, "Fetching events for window");

        self.events_since(app_key, cutoff).await
    }

    /// Events for an application with `time >= cutoff`, newest first.
    ///
    /// Ties on `time` are broken by descending id.
    pub async fn events_since(
        &self,
        app_key: &str,
        cutoff: i64,
    ) -> Result<Vec<Event>, DatabaseError> {
        let result = sqlx::query_as::<_, Event>(
            "SELECT id, client_key, app_key, time, platform, ip, country, version, name, data \
             FROM event WHERE app_key = $1 AND time >= $2 ORDER BY time DESC, id DESC",
        )
        .bind(app_key)
        .bind(cutoff)
        .fetch_all(self.pool())
        .await
        .map_err(DatabaseError::from);

        observe("events_since", &result);
        result
    }
}

#[cfg(feature = "metrics")]
fn observe<T>(query: &'static str, result: &Result<T, DatabaseError>) {
    let ok = match result {
        Ok(_) => true,
        Err(e) => e.is_not_found(),
    };
    appstats_core::metrics::record_query(query, ok);
}

#[cfg(not(feature = "metrics"))]
#[allow(clippy::missing_const_for_fn)]
fn observe<T>(_query: &'static str, _result: &Result<T, DatabaseError>) {}
