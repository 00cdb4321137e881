use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Connection, TLS, timeout, or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("invalid category URL \"{url}\": {reason}")]
    InvalidCategoryUrl { url: String, reason: String },

    #[error("page count {requested} is outside 1..={max}")]
    InvalidPageCount { requested: u32, max: u32 },
}

impl ScraperError {
    /// Returns `true` for failures of the request itself rather than of the
    /// server's answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ScraperError::Transport(_))
    }
}
