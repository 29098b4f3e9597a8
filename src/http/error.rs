use log::error;
use rouille::Response;
use serde::{Deserialize, Serialize};

use crate::{domain::video_id::InvalidVideoId, radio::error::RadioError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<InvalidVideoId> for ApiError {
    fn from(err: InvalidVideoId) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    /// Translates a radio failure, replacing anything internal with `failure`.
    ///
    /// The underlying error is logged, never sent to the client.
    pub fn from_radio(err: RadioError, failure: &str) -> Self {
        match err {
            RadioError::Validation(msg) => ApiError::BadRequest(msg),
            RadioError::NotFound(msg) => ApiError::NotFound(msg),
            RadioError::Provider(_) | RadioError::Storage(_) | RadioError::Internal(_) => {
                error!("{failure}: {err}");
                ApiError::Internal(failure.to_string())
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
        };
        Response::json(&ErrorBody { error }).with_status_code(status)
    }
}
