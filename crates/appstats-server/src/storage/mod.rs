//! Read-only storage for the appstats server.
//!
//! Maps the `application` and `event` tables into typed records. Every query
//! names its columns and binds its inputs; nothing here writes.

mod db;
mod models;
mod queries;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

pub use appstats_core::db::DatabaseError;
pub use db::AnalyticsDatabase;
pub use models::*;
