//! Video metadata resolution
//!
//! Adding a video needs its title, thumbnail and duration. The queue only
//! depends on the [`MetadataResolver`] trait; [`YouTubeResolver`] is the
//! production implementation and tests substitute a stub.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use watchq_common::ResolutionError;

pub mod youtube;

pub use youtube::YouTubeResolver;

/// Metadata for one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub thumbnail: Option<String>,
    /// Display form, `M:SS` or `H:MM:SS`
    pub duration: Option<String>,
}

/// Looks up video metadata by YouTube video id
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Resolve metadata for `video_id`
    ///
    /// # Errors
    /// * `Unavailable` - the video does not exist or is private
    /// * `Rejected` - upstream refused the request
    /// * `Transport` - network failure or unreadable response
    async fn resolve(&self, video_id: &str) -> Result<VideoMetadata, ResolutionError>;
}
