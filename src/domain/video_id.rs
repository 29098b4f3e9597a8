use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid video id {0:?}")]
pub struct InvalidVideoId(pub String);

/// Identifier of a track on the catalog provider.
///
/// Opaque to us, but restricted to the url-safe alphabet the provider uses,
/// so it can be placed into urls and command lines as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(s: &str) -> Result<Self, InvalidVideoId> {
        let valid = !s.is_empty()
            && s.len() <= MAX_LEN
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidVideoId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    /// thumbnail is templated from the id, never taken from provider data
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/0.jpg", self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = InvalidVideoId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_provider_ids() {
        for id in ["dQw4w9WgXcQ", "abc123", "a-b_c"] {
            assert_eq!(VideoId::parse(id).unwrap().as_str(), id);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let too_long = "a".repeat(65);
        for id in ["", "has space", "../etc/passwd", "q?x=1", too_long.as_str()] {
            assert!(VideoId::parse(id).is_err(), "{id:?} should be rejected");
        }
    }

    #[test]
    fn test_templated_urls() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        assert_eq!(
            id.thumbnail_url(),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/0.jpg"
        );
        assert_eq!(
            id.watch_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<VideoId, _> = serde_json::from_str("\"abc123\"");
        assert!(ok.is_ok());
        let bad: Result<VideoId, _> = serde_json::from_str("\"not valid\"");
        assert!(bad.is_err());
    }
}
