//! Ranking Engine
//!
//! Owns the total order over active items. `rank` is an opaque integer:
//! lower sorts first, equal ranks fall back to insertion order. Single-item
//! operations (append, deprioritize) place one item past the current maximum
//! and never touch other rows; only explicit multi-item moves renumber the
//! displayed subset through a bulk update.

use crate::db::{self, NewItem};
use crate::resolver::MetadataResolver;
use crate::tagging;
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;
use watchq_common::db::{Item, ItemStatus};
use watchq_common::video_id::require_video_id;
use watchq_common::{Error, Result};

pub mod ordering;

pub use ordering::{Move, RankUpdate};

/// Active items in display order
pub async fn list_active(db: &Pool<Sqlite>) -> Result<Vec<Item>> {
    db::items::list_active(db).await
}

/// Validate a URL, resolve its metadata and append it to the bottom
///
/// Tags are checked before the resolver is called so a bad tag list never
/// costs an upstream request.
pub async fn add_video(
    db: &Pool<Sqlite>,
    resolver: &dyn MetadataResolver,
    url: &str,
    tags: &[String],
) -> Result<Item> {
    let url = url.trim();
    let video_id = require_video_id(url)?;
    let tags = tagging::resolve_tag_names(db, tags).await?;

    debug!(video_id = %video_id, "Resolving video metadata");
    let metadata = resolver.resolve(&video_id).await?;

    append(
        db,
        NewItem {
            url: url.to_string(),
            title: metadata.title,
            thumbnail: metadata.thumbnail,
            duration: metadata.duration,
            tags,
        },
    )
    .await
}

/// Insert an active item at `max(active rank) + 1` (1 on an empty queue)
pub async fn append(db: &Pool<Sqlite>, item: NewItem) -> Result<Item> {
    let item = db::items::insert_at_bottom(db, &item).await?;
    info!(id = %item.id, rank = item.rank, title = %item.title, "Added video");
    Ok(item)
}

/// Apply a batch of rank assignments atomically
///
/// Unknown ids are skipped; an id listed twice rejects the whole batch.
/// Returns the number of items changed.
pub async fn bulk_reorder(db: &Pool<Sqlite>, updates: &[RankUpdate]) -> Result<usize> {
    ordering::validate_rank_updates(updates)?;
    if updates.is_empty() {
        return Ok(0);
    }

    let updated = db::items::update_ranks(db, updates).await?;
    debug!(requested = updates.len(), updated, "Applied bulk reorder");
    Ok(updated)
}

/// Move one item within the displayed subset and renumber that subset
///
/// `visible` is the ordered list the caller is displaying (after its
/// filters); `None` means the whole active queue. Returns the active queue
/// after the move.
pub async fn move_item(
    db: &Pool<Sqlite>,
    id: Uuid,
    movement: Move,
    visible: Option<&[Uuid]>,
) -> Result<Vec<Item>> {
    let active = db::items::list_active(db).await?;

    if !active.iter().any(|item| item.id == id) {
        // Distinguish a missing item from a watched one
        db::items::get_item(db, id).await?;
        return Err(Error::InvalidInput(format!("Item {} is not in the active queue", id)));
    }

    let displayed: Vec<Uuid> = match visible {
        Some(ids) => {
            let ids: Vec<Uuid> = ids
                .iter()
                .copied()
                .filter(|candidate| active.iter().any(|item| item.id == *candidate))
                .collect();
            ordering::validate_rank_updates(&ordering::contiguous_ranks(&ids))?;
            if !ids.contains(&id) {
                return Err(Error::InvalidInput(format!(
                    "Item {} is not among the displayed items",
                    id
                )));
            }
            ids
        }
        None => active.iter().map(|item| item.id).collect(),
    };

    match ordering::reposition(&displayed, id, movement)? {
        Some(updates) => {
            db::items::update_ranks(db, &updates).await?;
            debug!(id = %id, ?movement, renumbered = updates.len(), "Moved item");
            db::items::list_active(db).await
        }
        None => Ok(active),
    }
}

/// Send an item to the current bottom without renumbering others
pub async fn deprioritize(db: &Pool<Sqlite>, id: Uuid) -> Result<Item> {
    if db::items::move_to_bottom(db, id).await? == 0 {
        return Err(Error::NotFound(format!("Item not found: {}", id)));
    }

    let item = db::items::get_item(db, id).await?;
    info!(id = %id, rank = item.rank, "Deprioritized item");
    Ok(item)
}

/// Mark an item watched; it leaves every listing but keeps its row
pub async fn mark_watched(db: &Pool<Sqlite>, id: Uuid) -> Result<Item> {
    set_status(db, id, ItemStatus::Watched).await
}

/// Change an item's status
///
/// Watched is terminal: asking for `active` on a watched item is rejected.
pub async fn set_status(db: &Pool<Sqlite>, id: Uuid, status: ItemStatus) -> Result<Item> {
    let item = db::items::get_item(db, id).await?;

    if item.status == status {
        return Ok(item);
    }

    if item.status == ItemStatus::Watched {
        return Err(Error::InvalidInput(format!(
            "Item {} is watched and cannot return to the queue",
            id
        )));
    }

    db::items::set_status(db, id, status).await?;
    info!(id = %id, status = %status, "Updated item status");
    db::items::get_item(db, id).await
}
