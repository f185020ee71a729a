use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Chrome could not open the profile directory (is Chrome already running with it?): {0}")]
    ProfileLocked(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Timed out after {}s waiting for quick-grading fields", .0.as_secs())]
    Timeout(Duration),

    #[error("Page script returned unexpected data: {0}")]
    Script(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
