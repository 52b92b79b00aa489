//! Store access for items and the tag registry
//!
//! Thin wrappers over SQL. Rank arithmetic that must not race (append to
//! bottom, send to bottom) is done in a single statement; business rules
//! live in `queue` and `tagging`.

pub mod items;
pub mod tags;

pub use items::NewItem;
