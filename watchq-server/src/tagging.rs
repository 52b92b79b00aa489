//! Tag Cascade Manager
//!
//! Items reference tags by name, so renaming or deleting a registry entry
//! has to rewrite every item that carries the name, watched items included.
//!
//! The registry change and the cascade are two steps with no shared
//! transaction. Rename updates the registry first and then rewrites items;
//! delete strips items first and then removes the registry entry. A failed
//! cascade step is logged and the registry change stands.

use crate::db;
use sqlx::{Pool, Sqlite};
use tracing::{error, info, warn};
use uuid::Uuid;
use watchq_common::db::{Item, Tag, DEFAULT_TAG_COLOR};
use watchq_common::{Error, Result};

/// Trim a tag name and reject empty ones
pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Tag name cannot be empty".into()));
    }
    Ok(name.to_string())
}

/// Normalize a caller-supplied tag list against the registry
///
/// Names are trimmed and duplicates collapsed (first occurrence wins). Every
/// name must already be registered.
pub async fn resolve_tag_names(db: &Pool<Sqlite>, raw: &[String]) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw {
        let name = normalize_name(name)?;
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Ok(names);
    }

    let known = db::tags::existing_names(db, &names).await?;
    let unknown: Vec<&str> = names
        .iter()
        .filter(|n| !known.contains(n))
        .map(String::as_str)
        .collect();

    if !unknown.is_empty() {
        return Err(Error::InvalidInput(format!(
            "Unknown tag(s): {}",
            unknown.join(", ")
        )));
    }

    Ok(names)
}

pub async fn list_tags(db: &Pool<Sqlite>) -> Result<Vec<Tag>> {
    db::tags::list_tags(db).await
}

/// Register a new tag
pub async fn create_tag(db: &Pool<Sqlite>, name: &str, color: Option<&str>) -> Result<Tag> {
    let name = normalize_name(name)?;
    let color = color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_TAG_COLOR);

    if db::tags::find_by_name(db, &name).await?.is_some() {
        return Err(Error::Duplicate(format!("Tag already exists: {}", name)));
    }

    let tag = db::tags::insert_tag(db, &name, color).await?;
    info!(tag = %tag.name, color = %tag.color, "Created tag");
    Ok(tag)
}

/// Rename a tag and rewrite every item that carries the old name
pub async fn rename_tag(db: &Pool<Sqlite>, id: Uuid, new_name: &str) -> Result<Tag> {
    let new_name = normalize_name(new_name)?;
    let mut tag = db::tags::get_tag(db, id).await?;

    if tag.name == new_name {
        return Ok(tag);
    }

    if let Some(existing) = db::tags::find_by_name(db, &new_name).await? {
        if existing.id != id {
            return Err(Error::Duplicate(format!("Tag already exists: {}", new_name)));
        }
    }

    if db::tags::set_name(db, id, &new_name).await? == 0 {
        return Err(Error::NotFound(format!("Tag not found: {}", id)));
    }

    let old_name = std::mem::replace(&mut tag.name, new_name);

    match db::items::rename_tag_everywhere(db, &old_name, &tag.name).await {
        Ok(count) => {
            info!(from = %old_name, to = %tag.name, items = count, "Renamed tag");
        }
        Err(e) => {
            error!(
                from = %old_name,
                to = %tag.name,
                "Tag renamed in registry but item cascade failed: {}",
                e
            );
        }
    }

    Ok(tag)
}

/// Strip a tag from every item, then remove it from the registry
pub async fn delete_tag(db: &Pool<Sqlite>, id: Uuid) -> Result<Tag> {
    let tag = db::tags::get_tag(db, id).await?;

    match db::items::pull_tag_everywhere(db, &tag.name).await {
        Ok(count) => {
            info!(tag = %tag.name, items = count, "Removed tag from items");
        }
        Err(e) => {
            warn!(tag = %tag.name, "Failed to remove tag from items: {}", e);
        }
    }

    if db::tags::delete_tag(db, id).await? == 0 {
        return Err(Error::NotFound(format!("Tag not found: {}", id)));
    }

    info!(tag = %tag.name, "Deleted tag");
    Ok(tag)
}

/// Add a registered tag to an item; no-op if already present
pub async fn attach_tag(db: &Pool<Sqlite>, item_id: Uuid, name: &str) -> Result<Item> {
    let names = resolve_tag_names(db, &[name.to_string()]).await?;
    db::items::get_item(db, item_id).await?;

    for name in &names {
        db::items::add_tag(db, item_id, name).await?;
    }

    db::items::get_item(db, item_id).await
}

/// Remove a tag from an item; no-op if absent
pub async fn detach_tag(db: &Pool<Sqlite>, item_id: Uuid, name: &str) -> Result<Item> {
    let name = normalize_name(name)?;
    db::items::get_item(db, item_id).await?;
    db::items::remove_tag(db, item_id, &name).await?;
    db::items::get_item(db, item_id).await
}

/// Overwrite an item's tag list
pub async fn replace_item_tags(db: &Pool<Sqlite>, item_id: Uuid, tags: &[String]) -> Result<Item> {
    let names = resolve_tag_names(db, tags).await?;

    if db::items::set_tags(db, item_id, &names).await? == 0 {
        return Err(Error::NotFound(format!("Item not found: {}", item_id)));
    }

    db::items::get_item(db, item_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_name("  music ").unwrap(), "music");
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert!(matches!(normalize_name("   "), Err(Error::InvalidInput(_))));
        assert!(matches!(normalize_name(""), Err(Error::InvalidInput(_))));
    }
}
