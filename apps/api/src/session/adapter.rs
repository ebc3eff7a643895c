//! Browser automation seam. The session controller only ever talks to these traits;
//! page navigation, scrolling and DOM extraction live behind them.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::job::RawPosting;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error (status {status}): {message}")]
    WebDriver { status: u16, message: String },

    #[error("Invalid search URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected listing payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Browser session already closed")]
    Closed,
}

/// One exclusive browser instance. Not shareable: the owning session serializes access.
#[async_trait]
pub trait BrowserHandle: Send {
    /// Submits the search and returns once the results page has loaded.
    async fn open_search(&mut self, query: &str, location: &str) -> Result<(), AdapterError>;

    /// Scrolls to the listing entry at zero-based `index` and extracts it.
    /// Returns `Ok(None)` when the listing has no entry at that position.
    async fn extract_entry(&mut self, index: usize) -> Result<Option<RawPosting>, AdapterError>;

    /// Releases the browser. Calling it twice is harmless.
    async fn close(&mut self) -> Result<(), AdapterError>;
}

/// Acquires fresh browser handles.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, AdapterError>;
}
