//! Data models for appstats storage.
//!
//! Field order matches the column lists in `queries.rs` and the JSON key
//! order of the HTTP responses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub app_key: String,
    pub name: String,
    /// Epoch seconds.
    pub creation_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub client_key: String,
    pub app_key: String,
    /// Epoch seconds.
    pub time: i64,
    pub platform: String,
    pub ip: String,
    pub country: String,
    pub version: String,
    pub name: String,
    pub data: String,
}
