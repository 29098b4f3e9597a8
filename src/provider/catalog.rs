use crate::{
    domain::{track::TrackRef, video_id::VideoId},
    provider::error::ProviderError,
};

/// What kind of item the catalog returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Song,
    Video,
    Other,
}

impl ResultType {
    /// maps the provider's music video type marker
    pub fn from_music_video_type(marker: Option<&str>) -> Self {
        match marker {
            Some("MUSIC_VIDEO_TYPE_ATV") => ResultType::Song,
            Some("MUSIC_VIDEO_TYPE_OMV" | "MUSIC_VIDEO_TYPE_UGC" | "MUSIC_VIDEO_TYPE_OFFICIAL_SOURCE_MUSIC") => {
                ResultType::Video
            }
            _ => ResultType::Other,
        }
    }
}

/// A playable item as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub result_type: ResultType,
    pub video_id: VideoId,
    pub title: String,
    pub artists: Vec<String>,
}

impl CatalogEntry {
    pub fn is_song(&self) -> bool {
        self.result_type == ResultType::Song
    }

    pub fn to_track_ref(&self) -> TrackRef {
        TrackRef::new(self.video_id.clone(), self.title.clone(), &self.artists)
    }
}

/// Provider-side bundle around a track: what to play after it,
/// and where its lyrics live if it has any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchContext {
    pub tracks: Vec<CatalogEntry>,
    pub lyrics_browse_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lyrics {
    pub text: String,
}

/// Music catalog provider
pub trait Catalog: Send + Sync {
    /// song search, in provider order
    fn search_songs(&self, query: &str) -> Result<Vec<CatalogEntry>, ProviderError>;

    fn suggestions(&self, query: &str) -> Result<Vec<String>, ProviderError>;

    fn watch_context(&self, video_id: &VideoId) -> Result<WatchContext, ProviderError>;

    /// `Ok(None)` when the browse id leads to no lyrics payload
    fn lyrics(&self, browse_id: &str) -> Result<Option<Lyrics>, ProviderError>;
}
