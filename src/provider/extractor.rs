use std::{ffi::OsString, path::PathBuf, process::Command};

use log::debug;
use serde::Deserialize;

use crate::{
    config::ExtractorConfig,
    domain::{track::SongInfo, video_id::VideoId},
    provider::error::ProviderError,
};

const BEST_AUDIO_FORMAT: &str = "bestaudio/best";

/// Audio extraction tool
pub trait Extractor: Send + Sync {
    /// direct url of the best available audio stream
    fn audio_url(&self, video_id: &VideoId) -> Result<String, ProviderError>;

    fn song_info(&self, video_id: &VideoId) -> Result<SongInfo, ProviderError>;
}

/// Runs `yt-dlp` in no-download mode and reads the json it dumps
pub struct YtDlp {
    binary: PathBuf,
    config_location: Option<PathBuf>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfoJson {
    url: Option<String>,
    title: Option<String>,
    artist: Option<String>,
    artists: Option<Vec<String>>,
}

impl YtDlp {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            config_location: config.config_location.clone(),
            username: config.username.clone(),
        }
    }

    fn args(&self, video_id: &VideoId, format: Option<&str>) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["--quiet", "--no-warnings", "--no-playlist", "--dump-single-json"]
            .into_iter()
            .map(OsString::from)
            .collect();

        if let Some(format) = format {
            args.push("--format".into());
            args.push(format.into());
        }
        if let Some(location) = &self.config_location {
            args.push("--config-location".into());
            args.push(location.into());
        }
        if let Some(username) = &self.username {
            args.push("--username".into());
            args.push(username.into());
        }

        args.push("--".into());
        args.push(video_id.watch_url().into());
        args
    }

    fn extract(&self, video_id: &VideoId, format: Option<&str>) -> Result<InfoJson, ProviderError> {
        debug!("Running {} for {video_id}", self.binary.to_string_lossy());

        let output = Command::new(&self.binary)
            .args(self.args(video_id, format))
            .output()?;

        if !output.status.success() {
            return Err(ProviderError::Extractor {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl Extractor for YtDlp {
    fn audio_url(&self, video_id: &VideoId) -> Result<String, ProviderError> {
        self.extract(video_id, Some(BEST_AUDIO_FORMAT))?
            .url
            .ok_or_else(|| {
                ProviderError::UnexpectedResponse(format!("no stream url for {video_id}"))
            })
    }

    fn song_info(&self, video_id: &VideoId) -> Result<SongInfo, ProviderError> {
        Ok(self.extract(video_id, None)?.into_song_info(video_id))
    }
}

impl InfoJson {
    fn into_song_info(self, video_id: &VideoId) -> SongInfo {
        let artist = self
            .artist
            .or_else(|| self.artists.and_then(|artists| artists.into_iter().next()));
        SongInfo::new(video_id, self.title, artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::track::{UNKNOWN_ARTIST, UNKNOWN_TITLE};

    fn id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn to_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_args_for_stream_url() {
        let ytdlp = YtDlp::new(&ExtractorConfig::default());

        let args = to_strings(ytdlp.args(&id(), Some(BEST_AUDIO_FORMAT)));

        assert_eq!(
            args,
            vec![
                "--quiet",
                "--no-warnings",
                "--no-playlist",
                "--dump-single-json",
                "--format",
                "bestaudio/best",
                "--config-location",
                "yt_dlp.conf",
                "--username",
                "oauth2",
                "--",
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            ]
        );
    }

    #[test]
    fn test_args_without_auth_or_format() {
        let ytdlp = YtDlp::new(&ExtractorConfig {
            binary: "yt-dlp".into(),
            config_location: None,
            username: None,
        });

        let args = to_strings(ytdlp.args(&id(), None));

        assert!(!args.contains(&"--format".to_string()));
        assert!(!args.contains(&"--username".to_string()));
        assert_eq!(args.last().unwrap(), &id().watch_url());
    }

    #[test]
    fn test_info_json_to_song_info() -> anyhow::Result<()> {
        let info: InfoJson = serde_json::from_str(
            r#"{"id": "dQw4w9WgXcQ", "title": "Never Gonna Give You Up", "artist": "Rick Astley", "thumbnail": "https://i.ytimg.com/x.jpg"}"#,
        )?;

        let song = info.into_song_info(&id());

        assert_eq!(song.title, "Never Gonna Give You Up");
        assert_eq!(song.artist, "Rick Astley");
        // thumbnail is templated, not taken from extractor output
        assert_eq!(song.thumbnail, id().thumbnail_url());
        Ok(())
    }

    #[test]
    fn test_info_json_defaults() -> anyhow::Result<()> {
        let info: InfoJson = serde_json::from_str(r#"{"id": "dQw4w9WgXcQ"}"#)?;

        let song = info.into_song_info(&id());

        assert_eq!(song.title, UNKNOWN_TITLE);
        assert_eq!(song.artist, UNKNOWN_ARTIST);
        Ok(())
    }

    #[test]
    fn test_info_json_artists_list() -> anyhow::Result<()> {
        let info: InfoJson =
            serde_json::from_str(r#"{"title": "T", "artists": ["First", "Second"]}"#)?;
        assert_eq!(info.into_song_info(&id()).artist, "First");
        Ok(())
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let ytdlp = YtDlp::new(&ExtractorConfig {
            binary: "/nonexistent/yt-dlp-binary".into(),
            config_location: None,
            username: None,
        });

        let result = ytdlp.audio_url(&id());

        assert!(matches!(result, Err(ProviderError::Spawn(_))));
    }
}
