use chrono::{DateTime, Utc};
use rusqlite::{Row, params};

use crate::{
    config,
    domain::{history::HistoryEntry, track::TrackRef, video_id::VideoId},
    storage::{
        db::{self, time_to_millis},
        error::StorageError,
        schema::{columns::*, tables::*},
    },
};

pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Table of recently played tracks, one row per video id
pub struct HistoryStore {
    pub(crate) db: rusqlite::Connection,
}

impl HistoryStore {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        Ok(Self::from_existing_conn(db::open(db_config)?))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// Moves an existing row to `at`.
    ///
    /// Returns false if the track was never played, in which case nothing is written.
    pub fn touch(&self, video_id: &VideoId, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let updated = self.db.execute(
            &format!("UPDATE {PLAY_HISTORY} SET {PLAYED_AT} = ?1 WHERE {VIDEO_ID} = ?2"),
            params![time_to_millis(at), video_id.as_str()],
        )?;
        Ok(updated > 0)
    }

    /// Inserts a row for the track, or only moves its timestamp if one already exists.
    ///
    /// Title, artist and thumbnail of an existing row are left as they were.
    pub fn upsert(&self, track: &TrackRef, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.db.execute(
            &format!(
                "INSERT INTO {PLAY_HISTORY} ({VIDEO_ID}, {TITLE}, {ARTIST}, {THUMBNAIL}, {PLAYED_AT})
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT({VIDEO_ID}) DO UPDATE SET {PLAYED_AT} = excluded.{PLAYED_AT}"
            ),
            params![
                track.video_id.as_str(),
                track.title,
                track.artist,
                track.thumbnail,
                time_to_millis(at)
            ],
        )?;
        Ok(())
    }

    /// most recently played first
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StorageError> {
        self.ordered(limit, 0)
    }

    /// the second most recently played track
    pub fn previous(&self) -> Result<HistoryEntry, StorageError> {
        self.ordered(1, 1)?
            .into_iter()
            .next()
            .ok_or(StorageError::NoPreviousSong)
    }

    fn ordered(&self, limit: usize, offset: usize) -> Result<Vec<HistoryEntry>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let mut stmt = self.db.prepare(&format!(
            "SELECT {ID}, {VIDEO_ID}, {TITLE}, {ARTIST}, {THUMBNAIL}, {PLAYED_AT}
             FROM {PLAY_HISTORY}
             ORDER BY {PLAYED_AT} DESC, {ID} DESC
             LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt
            .query_map(params![limit, offset], RawEntry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawEntry::into_entry).collect()
    }
}

struct RawEntry {
    id: i64,
    video_id: String,
    title: String,
    artist: String,
    thumbnail: String,
    played_at: i64,
}

impl RawEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            video_id: row.get(1)?,
            title: row.get(2)?,
            artist: row.get(3)?,
            thumbnail: row.get(4)?,
            played_at: row.get(5)?,
        })
    }

    fn into_entry(self) -> Result<HistoryEntry, StorageError> {
        let video_id = VideoId::parse(&self.video_id).map_err(anyhow::Error::from)?;
        Ok(HistoryEntry {
            id: self.id,
            video_id,
            title: self.title,
            artist: self.artist,
            thumbnail: self.thumbnail,
            timestamp: db::millis_to_time(self.played_at)?,
        })
    }
}
