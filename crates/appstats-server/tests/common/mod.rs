//! Shared fixtures for router-level tests.

#![allow(dead_code, clippy::unwrap_used)]

use appstats_core::config::DatabaseConfig;
use appstats_server::storage::AnalyticsDatabase;

const SCHEMA: &str = include_str!("../fixtures/schema.sql");

/// Fresh in-memory database with the expected tables and no rows.
pub async fn test_db() -> AnalyticsDatabase {
    let config = DatabaseConfig {
        url: Some("sqlite::memory:".to_string()),
        max_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = AnalyticsDatabase::open(&config).await.unwrap();

    let script: String = SCHEMA
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    for statement in script.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(db.pool()).await.unwrap();
    }
    db
}

pub async fn insert_application(db: &AnalyticsDatabase, app_key: &str, name: &str, creation_time: i64) {
    sqlx::query("INSERT INTO application (app_key, name, creation_time) VALUES ($1, $2, $3)")
        .bind(app_key)
        .bind(name)
        .bind(creation_time)
        .execute(db.pool())
        .await
        .unwrap();
}

pub async fn insert_event(db: &AnalyticsDatabase, id: i64, app_key: &str, time: i64) {
    sqlx::query(
        "INSERT INTO event (id, client_key, app_key, time, platform, ip, country, version, name, data) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(id)
    .bind(format!("client-{id}"))
    .bind(app_key)
    .bind(time)
    .bind("ios")
    .bind("192.0.2.7")
    .bind("DE")
    .bind("2.0.0")
    .bind("purchase")
    .bind(r#"{"sku":"pro"}"#)
    .execute(db.pool())
    .await
    .unwrap();
}
