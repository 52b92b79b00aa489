//! Database models

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Queue visibility of an item
///
/// `Watched` is terminal: watched items never compete for rank again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Watched,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Watched => "watched",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(ItemStatus::Active),
            "watched" => Ok(ItemStatus::Watched),
            other => Err(Error::InvalidInput(format!("Unknown item status: {}", other))),
        }
    }
}

/// A video in the watch queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub thumbnail: Option<String>,
    /// `M:SS` or `H:MM:SS`
    pub duration: Option<String>,
    /// Tag names (not ids); no duplicates, order irrelevant
    pub tags: Vec<String>,
    pub rank: i64,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }
}

/// Raw `items` row; `tags` is a JSON array in a TEXT column
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub id: String,
    pub url: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: Option<String>,
    pub tags: String,
    pub rank: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = Error;

    fn try_from(row: ItemRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Internal(format!("Invalid item id {}: {}", row.id, e)))?;
        let tags: Vec<String> = serde_json::from_str(&row.tags)
            .map_err(|e| Error::Internal(format!("Invalid tag list on item {}: {}", row.id, e)))?;

        Ok(Item {
            id,
            url: row.url,
            title: row.title,
            thumbnail: row.thumbnail,
            duration: row.duration,
            tags,
            rank: row.rank,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// An entry in the global tag registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    /// Unique, case-sensitive
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Raw `tags` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TagRow> for Tag {
    type Error = Error;

    fn try_from(row: TagRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Internal(format!("Invalid tag id {}: {}", row.id, e)))?;

        Ok(Tag {
            id,
            name: row.name,
            color: row.color,
            created_at: row.created_at,
        })
    }
}

/// Default tag color
pub const DEFAULT_TAG_COLOR: &str = "blue";

/// Encode a tag list for the `items.tags` column
pub fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| Error::Internal(format!("Failed to encode tags: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        assert_eq!("active".parse::<ItemStatus>().unwrap(), ItemStatus::Active);
        assert_eq!("watched".parse::<ItemStatus>().unwrap(), ItemStatus::Watched);
        assert!("deleted".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_item_row_conversion() {
        let row = ItemRow {
            id: Uuid::new_v4().to_string(),
            url: "https://youtu.be/abc".to_string(),
            title: "A video".to_string(),
            thumbnail: None,
            duration: Some("3:10".to_string()),
            tags: r#"["music","live"]"#.to_string(),
            rank: 7,
            status: "active".to_string(),
            created_at: Utc::now(),
        };

        let item = Item::try_from(row).unwrap();
        assert_eq!(item.rank, 7);
        assert!(item.is_active());
        assert!(item.has_tag("live"));
        assert!(!item.has_tag("Live"));
    }

    #[test]
    fn test_item_row_with_corrupt_tags_is_internal_error() {
        let row = ItemRow {
            id: Uuid::new_v4().to_string(),
            url: "u".to_string(),
            title: "t".to_string(),
            thumbnail: None,
            duration: None,
            tags: "not json".to_string(),
            rank: 1,
            status: "active".to_string(),
            created_at: Utc::now(),
        };

        assert!(matches!(Item::try_from(row), Err(Error::Internal(_))));
    }
}
