//! `items` table operations

use crate::queue::ordering::RankUpdate;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use watchq_common::db::{encode_tags, Item, ItemRow, ItemStatus};
use watchq_common::{Error, Result};

const ITEM_COLUMNS: &str = "id, url, title, thumbnail, duration, tags, rank, status, created_at";

/// Fields of an item about to be appended
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub url: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: Option<String>,
    pub tags: Vec<String>,
}

fn rows_to_items(rows: Vec<ItemRow>) -> Result<Vec<Item>> {
    rows.into_iter().map(Item::try_from).collect()
}

/// Active items, rank ascending; equal ranks in insertion order
pub async fn list_active(db: &Pool<Sqlite>) -> Result<Vec<Item>> {
    let sql = format!(
        "SELECT {} FROM items WHERE status = 'active' ORDER BY rank ASC, rowid ASC",
        ITEM_COLUMNS
    );
    let rows = sqlx::query_as::<_, ItemRow>(&sql).fetch_all(db).await?;
    rows_to_items(rows)
}

/// Items of any status whose duration was never recorded
pub async fn list_missing_duration(db: &Pool<Sqlite>) -> Result<Vec<Item>> {
    let sql = format!(
        "SELECT {} FROM items WHERE duration IS NULL ORDER BY rowid ASC",
        ITEM_COLUMNS
    );
    let rows = sqlx::query_as::<_, ItemRow>(&sql).fetch_all(db).await?;
    rows_to_items(rows)
}

pub async fn get_item(db: &Pool<Sqlite>, id: Uuid) -> Result<Item> {
    let sql = format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS);
    let row = sqlx::query_as::<_, ItemRow>(&sql)
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Item not found: {}", id)))?;

    Item::try_from(row)
}

/// Insert an active item one past the current maximum active rank
///
/// The rank is computed inside the INSERT, so concurrent appends cannot
/// observe the same maximum.
pub async fn insert_at_bottom(db: &Pool<Sqlite>, item: &NewItem) -> Result<Item> {
    let id = Uuid::new_v4();
    let tags = encode_tags(&item.tags)?;

    sqlx::query(
        r#"
        INSERT INTO items (id, url, title, thumbnail, duration, tags, rank, status, created_at)
        SELECT ?, ?, ?, ?, ?, ?, COALESCE(MAX(rank), 0) + 1, 'active', ?
        FROM items
        WHERE status = 'active'
        "#,
    )
    .bind(id.to_string())
    .bind(&item.url)
    .bind(&item.title)
    .bind(&item.thumbnail)
    .bind(&item.duration)
    .bind(tags)
    .bind(Utc::now())
    .execute(db)
    .await?;

    get_item(db, id).await
}

/// Set rank to one past the current maximum active rank
///
/// Returns the number of rows changed (0 when the id is unknown).
pub async fn move_to_bottom(db: &Pool<Sqlite>, id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET rank = (SELECT COALESCE(MAX(rank), 0) + 1 FROM items WHERE status = 'active')
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

/// Apply rank updates atomically
///
/// Ids that match no item are skipped. Returns the number of items changed.
pub async fn update_ranks(db: &Pool<Sqlite>, updates: &[RankUpdate]) -> Result<usize> {
    let mut tx = db.begin().await?;
    let mut updated = 0usize;

    for update in updates {
        let result = sqlx::query("UPDATE items SET rank = ? WHERE id = ?")
            .bind(update.rank)
            .bind(update.id.to_string())
            .execute(&mut *tx)
            .await?;
        updated += result.rows_affected() as usize;
    }

    tx.commit().await?;
    Ok(updated)
}

pub async fn set_status(db: &Pool<Sqlite>, id: Uuid, status: ItemStatus) -> Result<u64> {
    let result = sqlx::query("UPDATE items SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn set_duration(db: &Pool<Sqlite>, id: Uuid, duration: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE items SET duration = ? WHERE id = ?")
        .bind(duration)
        .bind(id.to_string())
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

/// Overwrite an item's tag list
pub async fn set_tags(db: &Pool<Sqlite>, id: Uuid, tags: &[String]) -> Result<u64> {
    let result = sqlx::query("UPDATE items SET tags = ? WHERE id = ?")
        .bind(encode_tags(tags)?)
        .bind(id.to_string())
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

/// Append `name` to one item's tags unless already present
pub async fn add_tag(db: &Pool<Sqlite>, id: Uuid, name: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET tags = json_insert(tags, '$[#]', ?1)
        WHERE id = ?2
          AND NOT EXISTS (SELECT 1 FROM json_each(items.tags) WHERE value = ?1)
        "#,
    )
    .bind(name)
    .bind(id.to_string())
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

/// Remove `name` from one item's tags
pub async fn remove_tag(db: &Pool<Sqlite>, id: Uuid, name: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET tags = (SELECT json_group_array(value) FROM json_each(items.tags) WHERE value != ?1)
        WHERE id = ?2
          AND EXISTS (SELECT 1 FROM json_each(items.tags) WHERE value = ?1)
        "#,
    )
    .bind(name)
    .bind(id.to_string())
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

/// Remove `name` from every item that carries it, any status
pub async fn pull_tag_everywhere(db: &Pool<Sqlite>, name: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET tags = (SELECT json_group_array(value) FROM json_each(items.tags) WHERE value != ?1)
        WHERE EXISTS (SELECT 1 FROM json_each(items.tags) WHERE value = ?1)
        "#,
    )
    .bind(name)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

/// Replace `old` with `new` on every item that carries `old`, any status
///
/// Items already carrying `new` end up with a single copy.
pub async fn rename_tag_everywhere(db: &Pool<Sqlite>, old: &str, new: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET tags = (
            SELECT json_group_array(DISTINCT CASE WHEN value = ?1 THEN ?2 ELSE value END)
            FROM json_each(items.tags)
        )
        WHERE EXISTS (SELECT 1 FROM json_each(items.tags) WHERE value = ?1)
        "#,
    )
    .bind(old)
    .bind(new)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}
