//! Client-side projection of the active queue
//!
//! Filters compose: duration bucket first, then tags (an item matches when it
//! carries any selected tag), then sort direction. The projection never
//! changes ranks; it only decides which subset is displayed and in what
//! direction.

use serde::{Deserialize, Serialize};
use watchq_common::db::Item;
use watchq_common::DurationBucket;

/// Display direction over rank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Rank ascending (top of queue first)
    #[default]
    Asc,
    /// Rank descending
    Desc,
}

/// Active filter selections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub duration: DurationBucket,
    /// Empty means no tag filtering
    pub tags: Vec<String>,
}

impl ViewFilter {
    /// Whether an item survives both filters
    pub fn admits(&self, item: &Item) -> bool {
        self.duration.admits(item.duration.as_deref())
            && (self.tags.is_empty() || self.tags.iter().any(|tag| item.has_tag(tag)))
    }
}

/// Project rank-ordered active items through the filter and direction
///
/// `items` must already be in rank order. Watched items are dropped.
pub fn apply_view(items: Vec<Item>, filter: &ViewFilter, direction: SortDirection) -> Vec<Item> {
    let mut visible: Vec<Item> = items
        .into_iter()
        .filter(|item| item.is_active() && filter.admits(item))
        .collect();

    if direction == SortDirection::Desc {
        visible.reverse();
    }

    visible
}

/// Query string form of a view: `?duration=short&tags=a,b&order=desc`
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub duration: Option<DurationBucket>,
    pub tags: Option<String>,
    pub order: Option<SortDirection>,
}

impl ViewQuery {
    pub fn into_parts(self) -> (ViewFilter, SortDirection) {
        let tags = self
            .tags
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let filter = ViewFilter {
            duration: self.duration.unwrap_or_default(),
            tags,
        };

        (filter, self.order.unwrap_or_default())
    }
}
