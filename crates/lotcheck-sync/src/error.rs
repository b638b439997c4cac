use lotcheck_core::{CheckError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Check(#[from] CheckError),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Check(e) => e.kind(),
            _ => ErrorKind::Transport,
        }
    }
}
