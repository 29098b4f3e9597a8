//! The radio itself: every operation the http api offers,
//! on top of explicitly constructed provider handles and the history store.

use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::{
    config::Config,
    domain::{
        history::HistoryEntry,
        track::{SongInfo, TrackRef},
        video_id::VideoId,
    },
    provider::{
        cache::StreamUrlCache,
        catalog::{Catalog, CatalogEntry},
        extractor::{Extractor, YtDlp},
        innertube::InnertubeClient,
    },
    storage::{error::StorageError, history::HistoryStore},
};

pub mod error;

use error::RadioError;

pub const SEARCH_PAGE_SIZE: usize = 80;

pub struct Radio {
    catalog: Box<dyn Catalog>,
    extractor: Box<dyn Extractor>,
    stream_urls: StreamUrlCache,
    history: Mutex<HistoryStore>,
}

impl Radio {
    pub fn new(
        catalog: Box<dyn Catalog>,
        extractor: Box<dyn Extractor>,
        stream_urls: StreamUrlCache,
        history: HistoryStore,
    ) -> Self {
        Self {
            catalog,
            extractor,
            stream_urls,
            history: Mutex::new(history),
        }
    }

    /// wires up the real provider clients and opens the history database
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let catalog =
            InnertubeClient::new(&config.catalog).context("Failed to build catalog client")?;
        let history =
            HistoryStore::new(&config.database).context("Failed to open history database")?;

        Ok(Self::new(
            Box::new(catalog),
            Box::new(YtDlp::new(&config.extractor)),
            StreamUrlCache::new(&config.cache),
            history,
        ))
    }

    fn history(&self) -> Result<MutexGuard<'_, HistoryStore>, RadioError> {
        self.history
            .lock()
            .map_err(|e| RadioError::Internal(format!("history store lock poisoned: {e}")))
    }

    /// One page of songs matching the query, pages start at 1
    pub fn search(&self, query: &str, page: usize) -> Result<Vec<TrackRef>, RadioError> {
        if page == 0 {
            return Err(RadioError::Validation("page must be 1 or greater".into()));
        }
        let results = self.catalog.search_songs(query)?;
        Ok(paginate(&results, page))
    }

    pub fn suggest(&self, query: &str) -> Result<Vec<String>, RadioError> {
        Ok(self.catalog.suggestions(query)?)
    }

    /// `Ok(None)` when the track simply has no lyrics
    pub fn lyrics(&self, video_id: &VideoId) -> Result<Option<String>, RadioError> {
        let context = self.catalog.watch_context(video_id)?;
        let Some(browse_id) = context.lyrics_browse_id else {
            return Ok(None);
        };
        Ok(self.catalog.lyrics(&browse_id)?.map(|lyrics| lyrics.text))
    }

    pub fn stream_url(&self, video_id: &VideoId) -> Result<String, RadioError> {
        if let Some(url) = self.stream_urls.get(video_id) {
            debug!("Stream url for {video_id} served from cache");
            return Ok(url);
        }

        let url = self.extractor.audio_url(video_id)?;
        self.stream_urls.insert(video_id.clone(), url.clone());
        Ok(url)
    }

    pub fn song_info(&self, video_id: &VideoId) -> Result<SongInfo, RadioError> {
        Ok(self.extractor.song_info(video_id)?)
    }

    /// first track the provider queues after the current one
    pub fn next_song(&self, current: &VideoId) -> Result<TrackRef, RadioError> {
        self.catalog
            .watch_context(current)?
            .tracks
            .first()
            .map(CatalogEntry::to_track_ref)
            .ok_or_else(|| RadioError::NotFound("No next song found".into()))
    }

    pub fn record_play(&self, video_id: &VideoId) -> Result<(), RadioError> {
        self.record_play_at(video_id, Utc::now())
    }

    /// Moves a known track to `at`, or looks up its metadata and adds it.
    ///
    /// The store lock is not held while the extractor runs; two requests racing
    /// on a new track both insert, and the upsert keeps a single row.
    fn record_play_at(&self, video_id: &VideoId, at: DateTime<Utc>) -> Result<(), RadioError> {
        let known = self.history()?.touch(video_id, at)?;
        if known {
            debug!("Moved {video_id} to the top of history");
            return Ok(());
        }

        let track = self.extractor.song_info(video_id)?.into_track(video_id.clone());
        self.history()?.upsert(&track, at)?;
        info!("Added {video_id} ({} - {}) to history", track.artist, track.title);
        Ok(())
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, RadioError> {
        Ok(self.history()?.recent(limit)?)
    }

    /// second most recently played track
    pub fn previous(&self) -> Result<HistoryEntry, RadioError> {
        match self.history()?.previous() {
            Ok(entry) => Ok(entry),
            Err(StorageError::NoPreviousSong) => {
                Err(RadioError::NotFound("No previous song found".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps songs only, then cuts out the requested page
pub fn paginate(results: &[CatalogEntry], page: usize) -> Vec<TrackRef> {
    let start = page.saturating_sub(1).saturating_mul(SEARCH_PAGE_SIZE);
    results
        .iter()
        .filter(|entry| entry.is_song())
        .skip(start)
        .take(SEARCH_PAGE_SIZE)
        .map(CatalogEntry::to_track_ref)
        .collect()
}
