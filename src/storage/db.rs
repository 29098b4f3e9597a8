use std::path::Path;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

pub type MillisSinceUnix = i64;

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let db = if config.in_memory {
        open_in_memory()?
    } else {
        let path = config
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("database.path is required unless in_memory = true"))?;
        open_from_file(path)?
    };
    schema::init(&db)?;
    Ok(db)
}

pub fn time_to_millis(time: DateTime<Utc>) -> MillisSinceUnix {
    time.timestamp_millis()
}

/// converts number of milliseconds since unix epoch to utc date time
pub fn millis_to_time(since_unix: MillisSinceUnix) -> anyhow::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(since_unix)
        .ok_or(anyhow!("failed to convert {since_unix} ms timestamp to datetime"))
}
