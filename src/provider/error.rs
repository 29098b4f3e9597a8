use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider answered with status {0}")]
    Status(u16),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error("failed to run extractor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("extractor exited with {status}: {stderr}")]
    Extractor { status: String, stderr: String },
}
