//! In-process stand-ins for the external services, for tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    domain::{track::SongInfo, video_id::VideoId},
    provider::{
        catalog::{Catalog, CatalogEntry, Lyrics, ResultType, WatchContext},
        error::ProviderError,
        extractor::Extractor,
    },
};

pub fn failure() -> ProviderError {
    ProviderError::Status(503)
}

pub fn entry(id: &str, result_type: ResultType) -> CatalogEntry {
    CatalogEntry {
        result_type,
        video_id: VideoId::parse(id).unwrap(),
        title: format!("title {id}"),
        artists: vec![format!("artist {id}")],
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub songs: Vec<CatalogEntry>,
    pub suggestions: Vec<String>,
    pub watch: WatchContext,
    pub lyrics: Option<Lyrics>,
    pub failing: bool,
    pub failing_lyrics: bool,
}

impl FakeCatalog {
    fn check(&self) -> Result<(), ProviderError> {
        if self.failing { Err(failure()) } else { Ok(()) }
    }
}

impl Catalog for FakeCatalog {
    fn search_songs(&self, _query: &str) -> Result<Vec<CatalogEntry>, ProviderError> {
        self.check()?;
        Ok(self.songs.clone())
    }

    fn suggestions(&self, _query: &str) -> Result<Vec<String>, ProviderError> {
        self.check()?;
        Ok(self.suggestions.clone())
    }

    fn watch_context(&self, _video_id: &VideoId) -> Result<WatchContext, ProviderError> {
        self.check()?;
        Ok(self.watch.clone())
    }

    fn lyrics(&self, _browse_id: &str) -> Result<Option<Lyrics>, ProviderError> {
        self.check()?;
        if self.failing_lyrics {
            return Err(failure());
        }
        Ok(self.lyrics.clone())
    }
}

/// Counts how often each extractor operation ran
#[derive(Default, Clone)]
pub struct FakeExtractor {
    pub url_calls: Arc<AtomicUsize>,
    pub info_calls: Arc<AtomicUsize>,
    pub failing: bool,
}

impl FakeExtractor {
    pub fn url_calls(&self) -> usize {
        self.url_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }
}

impl Extractor for FakeExtractor {
    fn audio_url(&self, video_id: &VideoId) -> Result<String, ProviderError> {
        self.url_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(failure());
        }
        Ok(format!("https://audio.example/{video_id}"))
    }

    fn song_info(&self, video_id: &VideoId) -> Result<SongInfo, ProviderError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(failure());
        }
        Ok(SongInfo::new(
            video_id,
            Some(format!("title {video_id}")),
            Some(format!("artist {video_id}")),
        ))
    }
}
