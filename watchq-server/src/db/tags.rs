//! `tags` registry operations

use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use watchq_common::db::{Tag, TagRow};
use watchq_common::{Error, Result};

fn duplicate_or(err: sqlx::Error, name: &str) -> Error {
    let err = Error::from(err);
    if err.is_unique_violation() {
        Error::Duplicate(format!("Tag already exists: {}", name))
    } else {
        err
    }
}

/// All tags, name ascending
pub async fn list_tags(db: &Pool<Sqlite>) -> Result<Vec<Tag>> {
    let rows = sqlx::query_as::<_, TagRow>(
        "SELECT id, name, color, created_at FROM tags ORDER BY name ASC",
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(Tag::try_from).collect()
}

pub async fn get_tag(db: &Pool<Sqlite>, id: Uuid) -> Result<Tag> {
    let row = sqlx::query_as::<_, TagRow>(
        "SELECT id, name, color, created_at FROM tags WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Tag not found: {}", id)))?;

    Tag::try_from(row)
}

pub async fn find_by_name(db: &Pool<Sqlite>, name: &str) -> Result<Option<Tag>> {
    let row = sqlx::query_as::<_, TagRow>(
        "SELECT id, name, color, created_at FROM tags WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(db)
    .await?;

    row.map(Tag::try_from).transpose()
}

/// Registered names among `names`
pub async fn existing_names(db: &Pool<Sqlite>, names: &[String]) -> Result<Vec<String>> {
    let mut found = Vec::with_capacity(names.len());
    for name in names {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(db)
            .await?;
        if exists.is_some() {
            found.push(name.clone());
        }
    }
    Ok(found)
}

/// Insert a tag; a name collision is `Duplicate`
pub async fn insert_tag(db: &Pool<Sqlite>, name: &str, color: &str) -> Result<Tag> {
    let tag = Tag {
        id: Uuid::new_v4(),
        name: name.to_string(),
        color: color.to_string(),
        created_at: Utc::now(),
    };

    sqlx::query("INSERT INTO tags (id, name, color, created_at) VALUES (?, ?, ?, ?)")
        .bind(tag.id.to_string())
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(tag.created_at)
        .execute(db)
        .await
        .map_err(|e| duplicate_or(e, name))?;

    Ok(tag)
}

/// Change a tag's name; a name collision is `Duplicate`
pub async fn set_name(db: &Pool<Sqlite>, id: Uuid, name: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id.to_string())
        .execute(db)
        .await
        .map_err(|e| duplicate_or(e, name))?;

    Ok(result.rows_affected())
}

pub async fn delete_tag(db: &Pool<Sqlite>, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}
