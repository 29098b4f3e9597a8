use rusqlite::Connection;

pub mod tables {
    pub const PLAY_HISTORY: &str = "play_history";

    pub const ALL_TABLES: &[&str] = &[PLAY_HISTORY];
}

pub mod columns {
    pub const ID: &str = "id";
    pub const VIDEO_ID: &str = "video_id";
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const THUMBNAIL: &str = "thumbnail";
    /// milliseconds since unix epoch
    pub const PLAYED_AT: &str = "played_at";
}

pub use columns::*;
pub use tables::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS play_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    thumbnail TEXT NOT NULL,
    played_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS play_history_played_at ON play_history (played_at DESC, id DESC);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
