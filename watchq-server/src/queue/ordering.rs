//! Pure re-sequencing of a displayed queue
//!
//! Nothing here touches the store. A move takes the ordered ids the caller
//! is displaying, relocates one of them, and renumbers exactly that subset
//! `1..=N`. The result is persisted through a bulk rank update.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use watchq_common::{Error, Result};

/// New rank for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankUpdate {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub rank: i64,
}

/// Where to move an item within the displayed list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Top,
    Up,
    Down,
    Bottom,
    /// Drag-and-drop target position (0-based, clamped to the list)
    ToIndex(usize),
}

impl Move {
    /// Target index for an item currently at `from` in a list of `len`
    fn target(self, from: usize, len: usize) -> usize {
        let last = len.saturating_sub(1);
        match self {
            Move::Top => 0,
            Move::Up => from.saturating_sub(1),
            Move::Down => (from + 1).min(last),
            Move::Bottom => last,
            Move::ToIndex(index) => index.min(last),
        }
    }
}

/// Rank assignment `1..=N` in the given order
pub fn contiguous_ranks(ids: &[Uuid]) -> Vec<RankUpdate> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| RankUpdate {
            id: *id,
            rank: index as i64 + 1,
        })
        .collect()
}

/// Move `id` within `displayed` and renumber the displayed subset
///
/// Returns `Ok(None)` when the move would not change the order (already at
/// the top for `Top`/`Up`, already last for `Down`/`Bottom`, same index for
/// `ToIndex`).
pub fn reposition(displayed: &[Uuid], id: Uuid, movement: Move) -> Result<Option<Vec<RankUpdate>>> {
    let from = displayed
        .iter()
        .position(|candidate| *candidate == id)
        .ok_or_else(|| Error::NotFound(format!("Item {} is not in the displayed queue", id)))?;

    let to = movement.target(from, displayed.len());
    if to == from {
        return Ok(None);
    }

    let mut reordered = displayed.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);

    Ok(Some(contiguous_ranks(&reordered)))
}

/// Reject reorder payloads that name the same item twice
pub fn validate_rank_updates(updates: &[RankUpdate]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(updates.len());
    for update in updates {
        if !seen.insert(update.id) {
            return Err(Error::InvalidInput(format!(
                "Item {} appears more than once in reorder payload",
                update.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn order_of(updates: &[RankUpdate]) -> Vec<Uuid> {
        let mut sorted = updates.to_vec();
        sorted.sort_by_key(|u| u.rank);
        sorted.into_iter().map(|u| u.id).collect()
    }

    #[test]
    fn test_contiguous_ranks_start_at_one() {
        let list = ids(3);
        let ranks: Vec<i64> = contiguous_ranks(&list).iter().map(|u| u.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_move_to_top() {
        let list = ids(4);
        let updates = reposition(&list, list[2], Move::Top).unwrap().unwrap();
        assert_eq!(order_of(&updates), vec![list[2], list[0], list[1], list[3]]);
    }

    #[test]
    fn test_move_up_and_down_swap_neighbours() {
        let list = ids(3);

        let up = reposition(&list, list[1], Move::Up).unwrap().unwrap();
        assert_eq!(order_of(&up), vec![list[1], list[0], list[2]]);

        let down = reposition(&list, list[1], Move::Down).unwrap().unwrap();
        assert_eq!(order_of(&down), vec![list[0], list[2], list[1]]);
    }

    #[test]
    fn test_move_to_bottom() {
        let list = ids(3);
        let updates = reposition(&list, list[0], Move::Bottom).unwrap().unwrap();
        assert_eq!(order_of(&updates), vec![list[1], list[2], list[0]]);
    }

    #[test]
    fn test_boundary_moves_are_noops() {
        let list = ids(3);
        assert_eq!(reposition(&list, list[0], Move::Top).unwrap(), None);
        assert_eq!(reposition(&list, list[0], Move::Up).unwrap(), None);
        assert_eq!(reposition(&list, list[2], Move::Down).unwrap(), None);
        assert_eq!(reposition(&list, list[2], Move::Bottom).unwrap(), None);
        assert_eq!(reposition(&list, list[1], Move::ToIndex(1)).unwrap(), None);
    }

    #[test]
    fn test_single_item_never_moves() {
        let list = ids(1);
        for movement in [Move::Top, Move::Up, Move::Down, Move::Bottom, Move::ToIndex(5)] {
            assert_eq!(reposition(&list, list[0], movement).unwrap(), None);
        }
    }

    #[test]
    fn test_to_index_is_clamped() {
        let list = ids(3);
        let updates = reposition(&list, list[0], Move::ToIndex(99)).unwrap().unwrap();
        assert_eq!(order_of(&updates), vec![list[1], list[2], list[0]]);
    }

    #[test]
    fn test_drag_forward_matches_array_move() {
        let list = ids(5);
        let updates = reposition(&list, list[1], Move::ToIndex(3)).unwrap().unwrap();
        assert_eq!(order_of(&updates), vec![list[0], list[2], list[3], list[1], list[4]]);
    }

    #[test]
    fn test_renumbers_every_displayed_item() {
        let list = ids(4);
        let updates = reposition(&list, list[3], Move::Up).unwrap().unwrap();
        assert_eq!(updates.len(), 4);
        let mut ranks: Vec<i64> = updates.iter().map(|u| u.rank).collect();
        ranks.sort();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let list = ids(2);
        let result = reposition(&list, Uuid::new_v4(), Move::Top);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_duplicate_ids_in_payload_rejected() {
        let id = Uuid::new_v4();
        let updates = [RankUpdate { id, rank: 1 }, RankUpdate { id, rank: 2 }];
        assert!(matches!(validate_rank_updates(&updates), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rank_update_accepts_underscore_id() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"_id": "{}", "rank": 3}}"#, id);
        let update: RankUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(update, RankUpdate { id, rank: 3 });
    }

    #[test]
    fn test_move_deserializes_from_json() {
        assert_eq!(serde_json::from_str::<Move>(r#""top""#).unwrap(), Move::Top);
        assert_eq!(
            serde_json::from_str::<Move>(r#"{"to_index": 2}"#).unwrap(),
            Move::ToIndex(2)
        );
    }
}
