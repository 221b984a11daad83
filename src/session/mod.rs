//! User session: cached profile, its storage, and backend validation.

mod storage;
mod store;
mod verify;

use thiserror::Error;

pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{SessionStore, USER_KEY};
pub use verify::UserVerifier;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("backend URL cannot take path segments: {0}")]
    BaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
