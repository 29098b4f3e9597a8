use anyhow::anyhow;
use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::HttpConfig,
    domain::video_id::VideoId,
    http::error::ApiError,
    radio::Radio,
    storage::history::DEFAULT_RECENT_LIMIT,
};

const LYRICS_SOURCE: &str = "YouTube Music";

pub struct HttpServer {
    radio: Arc<Radio>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(radio: Radio, config: HttpConfig) -> Self {
        Self {
            radio: Arc::new(radio),
            config,
        }
    }

    /// serves requests on a fixed size thread pool until the process exits
    pub fn run(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        let workers = self.config.workers.max(1);

        let server = rouille::Server::new(&addr, move |request| self.handle_request(request))
            .map_err(|e| anyhow!("Failed to bind {addr}: {e}"))?
            .pool_size(workers);

        info!("Listening on http://{addr} with {workers} workers");
        server.run();
        Ok(())
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let result = rouille::router!(request,
            (GET) (/radio/search) => {
                self.handle_search(request)
            },
            (GET) (/radio/lyrics/{video_id: String}) => {
                self.handle_lyrics(&video_id)
            },
            (GET) (/radio/stream/{video_id: String}) => {
                self.handle_stream(&video_id)
            },
            (POST) (/radio/add_to_history) => {
                self.handle_add_to_history(request)
            },
            (GET) (/radio/recent_songs) => {
                self.handle_recent_songs()
            },
            (GET) (/radio/suggest) => {
                self.handle_suggest(request)
            },
            (GET) (/radio/next_song) => {
                self.handle_next_song(request)
            },
            (GET) (/radio/song_info/{video_id: String}) => {
                self.handle_song_info(&video_id)
            },
            (GET) (/radio/previous_song) => {
                self.handle_previous_song()
            },
            _ => Err(ApiError::NotFound("not found".into()))
        );

        let response = result.unwrap_or_else(ApiError::into_response);
        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn handle_search(&self, request: &Request) -> Result<Response, ApiError> {
        let query = request.get_param("q").unwrap_or_default();
        let page = match request.get_param("page") {
            Some(page) => page
                .parse::<usize>()
                .map_err(|_| ApiError::BadRequest("page must be a positive integer".into()))?,
            None => 1,
        };

        let songs = self
            .radio
            .search(&query, page)
            .map_err(|e| ApiError::from_radio(e, "Failed to search songs"))?;
        Ok(Response::json(&songs))
    }

    /// Always answers with a lyrics status, the http code only tells errors apart
    fn handle_lyrics(&self, video_id: &str) -> Result<Response, ApiError> {
        let video_id = VideoId::parse(video_id)?;

        let response = match self.radio.lyrics(&video_id) {
            Ok(Some(lyrics)) => Response::json(&LyricsResponse::Success {
                lyrics,
                source: LYRICS_SOURCE.to_string(),
            }),
            Ok(None) => Response::json(&LyricsResponse::NotFound {
                message: "No lyrics available for this song.".into(),
            }),
            Err(e) => {
                log::error!("Error getting lyrics for {video_id}: {e}");
                Response::json(&LyricsResponse::Error {
                    message: "Failed to fetch lyrics".into(),
                })
                .with_status_code(500)
            }
        };
        Ok(response)
    }

    fn handle_stream(&self, video_id: &str) -> Result<Response, ApiError> {
        let video_id = VideoId::parse(video_id)?;
        let url = self
            .radio
            .stream_url(&video_id)
            .map_err(|e| ApiError::from_radio(e, "Failed to resolve audio stream"))?;
        Ok(Response::text(url))
    }

    fn handle_add_to_history(&self, request: &Request) -> Result<Response, ApiError> {
        let input = rouille::post_input!(request, { video_id: Option<String> })
            .map_err(|e| ApiError::BadRequest(format!("invalid form: {e}")))?;

        let video_id = match input.video_id.as_deref() {
            Some(id) if !id.is_empty() => VideoId::parse(id)?,
            _ => return Err(ApiError::BadRequest("No video_id provided".into())),
        };

        self.radio
            .record_play(&video_id)
            .map_err(|e| ApiError::from_radio(e, "Failed to add song to history"))?;
        Ok(Response::json(&SuccessResponse { success: true }))
    }

    fn handle_recent_songs(&self) -> Result<Response, ApiError> {
        let songs = self
            .radio
            .recent(DEFAULT_RECENT_LIMIT)
            .map_err(|e| ApiError::from_radio(e, "Failed to load recent songs"))?;
        Ok(Response::json(&songs))
    }

    fn handle_suggest(&self, request: &Request) -> Result<Response, ApiError> {
        let query = request.get_param("q").unwrap_or_default();
        let suggestions = self
            .radio
            .suggest(&query)
            .map_err(|e| ApiError::from_radio(e, "Failed to get suggestions"))?;
        Ok(Response::json(&suggestions))
    }

    fn handle_next_song(&self, request: &Request) -> Result<Response, ApiError> {
        let current = match request.get_param("current_song_id") {
            Some(id) if !id.is_empty() => VideoId::parse(&id)?,
            _ => return Err(ApiError::BadRequest("No current_song_id provided".into())),
        };

        let next = self
            .radio
            .next_song(&current)
            .map_err(|e| ApiError::from_radio(e, "Failed to get next song"))?;
        Ok(Response::json(&next))
    }

    fn handle_song_info(&self, video_id: &str) -> Result<Response, ApiError> {
        let video_id = VideoId::parse(video_id)?;
        let info = self
            .radio
            .song_info(&video_id)
            .map_err(|e| ApiError::from_radio(e, "Failed to get song info"))?;
        Ok(Response::json(&info))
    }

    fn handle_previous_song(&self) -> Result<Response, ApiError> {
        let previous = self
            .radio
            .previous()
            .map_err(|e| ApiError::from_radio(e, "Failed to get previous song"))?;
        Ok(Response::json(&previous))
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LyricsResponse {
    Success { lyrics: String, source: String },
    NotFound { message: String },
    Error { message: String },
}

#[derive(Serialize, Deserialize)]
struct SuccessResponse {
    success: bool,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
