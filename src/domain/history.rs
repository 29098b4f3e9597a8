use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::video_id::VideoId;

/// A previously played track and when it was last played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub video_id: VideoId,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub timestamp: DateTime<Utc>,
}
