//! Storage layer tests for appstats.

use super::db::AnalyticsDatabase;
use super::models::Event;
use appstats_core::db::{DatabaseError, unix_timestamp};

const SCHEMA: &str = include_str!("../../tests/fixtures/schema.sql");

async fn empty_db() -> AnalyticsDatabase {
    AnalyticsDatabase::connect("sqlite::memory:", 1)
        .await
        .unwrap()
}

async fn test_db() -> AnalyticsDatabase {
    let db = empty_db().await;
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

async fn insert_application(db: &AnalyticsDatabase, app_key: &str, name: &str, creation_time: i64) {
    sqlx::query("INSERT INTO application (app_key, name, creation_time) VALUES ($1, $2, $3)")
        .bind(app_key)
        .bind(name)
        .bind(creation_time)
        .execute(db.pool())
        .await
        .unwrap();
}

async fn insert_event(db: &AnalyticsDatabase, id: i64, app_key: &str, time: i64) {
    sqlx::query(
        "INSERT INTO event (id, client_key, app_key, time, platform, ip, country, version, name, data) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(id)
    .bind(format!("client-{id}"))
    .bind(app_key)
    .bind(time)
    .bind("android")
    .bind("10.0.0.1")
    .bind("NL")
    .bind("1.2.3")
    .bind("app_open")
    .bind(r#"{"screen":"home"}"#)
    .execute(db.pool())
    .await
    .unwrap();
}

fn ids(events: &[Event]) -> Vec<i64> {
    events.iter().map(|e| e.id).collect()
}

// === Application tests ===

#[tokio::test]
async fn get_application_by_key() {
    let db = test_db().await;
    insert_application(&db, "k1", "Demo", 1000).await;
    insert_application(&db, "k2", "Other", 2000).await;

    let app = db.get_application("k1").await.unwrap();
    assert_eq!(app.app_key, "k1");
    assert_eq!(app.name, "Demo");
    assert_eq!(app.creation_time, 1000);
}

#[tokio::test]
async fn get_application_matches_exactly() {
    let db = test_db().await;
    insert_application(&db, "k1", "Demo", 1000).await;

    for near_miss in ["K1", "k1 ", " k1", "k"] {
        let err = db.get_application(near_miss).await.unwrap_err();
        assert!(err.is_not_found(), "{near_miss:?} should not match: {err}");
    }
}

#[tokio::test]
async fn missing_application_is_not_found() {
    let db = test_db().await;
    let err = db.get_application("absent").await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_keys_return_one_row() {
    let db = test_db().await;
    insert_application(&db, "dup", "First", 1).await;
    insert_application(&db, "dup", "Second", 2).await;

    let app = db.get_application("dup").await.unwrap();
    assert_eq!(app.app_key, "dup");
}

#[tokio::test]
async fn list_applications_empty_store() {
    let db = test_db().await;
    let apps = db.list_applications().await.unwrap();
    assert!(apps.is_empty());
}

#[tokio::test]
async fn list_applications_returns_all_rows() {
    let db = test_db().await;
    insert_application(&db, "b", "Beta", 200).await;
    insert_application(&db, "a", "Alpha", 100).await;

    let apps = db.list_applications().await.unwrap();
    let keys: Vec<&str> = apps.iter().map(|a| a.app_key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

// === Event tests ===

#[tokio::test]
async fn events_within_window_newest_first() {
    let db = test_db().await;
    let now = unix_timestamp();
    insert_application(&db, "k1", "Demo", 1000).await;
    insert_event(&db, 1, "k1", now).await;
    insert_event(&db, 2, "k1", now - 3600).await;
    insert_event(&db, 3, "k1", now - 60).await;

    let events = db.events_for_application("k1", 30).await.unwrap();
    assert_eq!(ids(&events), vec![1, 3]);
}

#[tokio::test]
async fn events_are_scoped_to_application() {
    let db = test_db().await;
    let now = unix_timestamp();
    insert_event(&db, 1, "k1", now).await;
    insert_event(&db, 2, "k2", now).await;
    insert_event(&db, 3, "K1", now).await;

    let events = db.events_for_application("k1", 10).await.unwrap();
    assert_eq!(ids(&events), vec![1]);
    assert_eq!(events[0].app_key, "k1");
}

#[tokio::test]
async fn events_since_includes_cutoff_boundary() {
    let db = test_db().await;
    insert_event(&db, 1, "k1", 5000).await;
    insert_event(&db, 2, "k1", 4999).await;
    insert_event(&db, 3, "k1", 5001).await;

    let events = db.events_since("k1", 5000).await.unwrap();
    assert_eq!(ids(&events), vec![3, 1]);
}

#[tokio::test]
async fn events_ordering_is_non_increasing() {
    let db = test_db().await;
    let now = unix_timestamp();
    for (id, offset) in [(1, 300), (2, 10), (3, 900), (4, 10), (5, 0)] {
        insert_event(&db, id, "k1", now - offset).await;
    }

    let events = db.events_for_application("k1", 60).await.unwrap();
    assert_eq!(events.len(), 5);
    assert!(events.windows(2).all(|w| w[0].time >= w[1].time));
    // Equal timestamps fall back to descending id.
    assert_eq!(ids(&events), vec![5, 4, 2, 1, 3]);
}

#[tokio::test]
async fn zero_window_excludes_past_events() {
    let db = test_db().await;
    let now = unix_timestamp();
    insert_event(&db, 1, "k1", now - 10).await;
    insert_event(&db, 2, "k1", now + 60).await;

    let events = db.events_for_application("k1", 0).await.unwrap();
    assert_eq!(ids(&events), vec![2]);
}

#[tokio::test]
async fn huge_window_returns_full_history() {
    let db = test_db().await;
    insert_event(&db, 1, "k1", 0).await;
    insert_event(&db, 2, "k1", 1_000_000).await;

    let events = db.events_for_application("k1", u64::MAX).await.unwrap();
    assert_eq!(ids(&events), vec![2, 1]);
}

#[tokio::test]
async fn event_fields_are_mapped_by_name() {
    let db = test_db().await;
    insert_event(&db, 7, "k1", 1234).await;

    let events = db.events_since("k1", 0).await.unwrap();
    assert_eq!(
        events,
        vec![Event {
            id: 7,
            client_key: "client-7".to_string(),
            app_key: "k1".to_string(),
            time: 1234,
            platform: "android".to_string(),
            ip: "10.0.0.1".to_string(),
            country: "NL".to_string(),
            version: "1.2.3".to_string(),
            name: "app_open".to_string(),
            data: r#"{"screen":"home"}"#.to_string(),
        }]
    );
}

// === Failure tests ===

#[tokio::test]
async fn missing_table_is_a_query_error() {
    let db = empty_db().await;
    let err = db.list_applications().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Query(_)));

    // A broken query is never reported as "not found".
    let err = db.get_application("k1").await.unwrap_err();
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn type_mismatch_aborts_the_scan() {
    let db = empty_db().await;
    sqlx::query("CREATE TABLE application (app_key TEXT, name TEXT, creation_time TEXT)")
        .execute(db.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO application VALUES ('k1', 'Demo', 'yesterday')")
        .execute(db.pool())
        .await
        .unwrap();

    let err = db.list_applications().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Query(_)));
}

#[tokio::test]
async fn closed_pool_is_a_connection_error() {
    let db = test_db().await;
    db.close().await;

    let err = db.events_for_application("k1", 30).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Connection(_)));
}
