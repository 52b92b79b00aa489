//! Tests for database initialization and schema upgrades

use sqlx::Row;
use watchq_common::db::init::{create_schema, init_database, init_memory_database};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("watchq.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("watchq.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_schema_creation_is_idempotent() {
    let pool = init_memory_database().await.unwrap();
    create_schema(&pool).await.unwrap();
    create_schema(&pool).await.unwrap();

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert!(tables.contains(&"items".to_string()));
    assert!(tables.contains(&"tags".to_string()));
}

#[tokio::test]
async fn test_tag_names_are_unique_and_case_sensitive() {
    let pool = init_memory_database().await.unwrap();

    let insert = |id: &'static str, name: &'static str| {
        sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
    };

    insert("1", "music").execute(&pool).await.unwrap();
    insert("2", "Music").execute(&pool).await.unwrap();
    assert!(insert("3", "music").execute(&pool).await.is_err());
}

#[tokio::test]
async fn test_missing_optional_columns_are_added() {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    // Table as written by a build that predates thumbnails and durations
    sqlx::query(
        r#"
        CREATE TABLE items (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            rank INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    create_schema(&pool).await.unwrap();

    let columns: Vec<String> = sqlx::query("PRAGMA table_info(items)")
        .fetch_all(&pool)
        .await
        .unwrap()
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();

    assert!(columns.contains(&"thumbnail".to_string()));
    assert!(columns.contains(&"duration".to_string()));
}

#[tokio::test]
async fn test_status_check_constraint() {
    let pool = init_memory_database().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO items (id, url, title, status) VALUES ('x', 'u', 't', 'deleted')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}
