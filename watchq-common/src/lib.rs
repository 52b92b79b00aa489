//! # WatchQ Common Library
//!
//! Shared code for the WatchQ service and its maintenance tools:
//! - Error taxonomy (validation, not-found, duplicate, resolution, store)
//! - Configuration loading and root folder resolution
//! - Database initialization and persisted models
//! - Duration parsing and bucketing
//! - YouTube video-id extraction

pub mod config;
pub mod db;
pub mod duration;
pub mod error;
pub mod video_id;

pub use duration::DurationBucket;
pub use error::{Error, ResolutionError, Result};
