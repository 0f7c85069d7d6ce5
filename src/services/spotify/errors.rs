use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spotify API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("invalid Spotify response: {0}")]
    InvalidResponse(String),
    #[error("Spotify request could not be retried")]
    RequestNotCloneable,
}
