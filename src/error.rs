// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] gloo_net::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("media id {0:?} cannot be displayed by this player")]
    InvalidMedia(String),

    #[error("browser DOM call failed: {0}")]
    Dom(String),

    #[error("page has no element #{0}")]
    MissingElement(String),
}
