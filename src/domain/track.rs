use serde::{Deserialize, Serialize};

use super::video_id::VideoId;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Minimal identifying record for a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub video_id: VideoId,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
}

impl TrackRef {
    /// builds a reference from provider data, taking the first credited artist
    pub fn new(video_id: VideoId, title: String, artists: &[String]) -> Self {
        let artist = artists
            .first()
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let thumbnail = video_id.thumbnail_url();
        Self {
            video_id,
            title,
            artist,
            thumbnail,
        }
    }
}

/// Metadata of a single song as reported by the audio extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
}

impl SongInfo {
    pub fn new(video_id: &VideoId, title: Option<String>, artist: Option<String>) -> Self {
        Self {
            title: title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            thumbnail: video_id.thumbnail_url(),
        }
    }

    pub fn into_track(self, video_id: VideoId) -> TrackRef {
        TrackRef {
            video_id,
            title: self.title,
            artist: self.artist,
            thumbnail: self.thumbnail,
        }
    }
}
