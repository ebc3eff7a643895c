//! Session controller. Owns the one browser handle of an interactive session and
//! walks the job listing one record at a time.
//!
//! # Lifecycle
//! - `start` releases any previous handle, acquires a new one, opens the results
//!   page and extracts entry 0.
//! - `advance` extracts the next entry; past the end it returns
//!   `ListingStep::Exhausted` on this and every later call.
//! - `close` releases the handle and clears the listing state. Idempotent.
//!
//! An adapter failure during `start` or `advance` ends the search: the handle is
//! released before `ResourceUnavailable` is returned. Nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::job::JobRecord;
use crate::session::adapter::{AdapterError, BrowserHandle, BrowserLauncher};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("browser resource unavailable: {0}")]
    ResourceUnavailable(#[from] AdapterError),

    #[error("precondition failed: {0}")]
    PreconditionFailed(&'static str),
}

/// Outcome of one step through the listing. Exhaustion is terminal, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "job", rename_all = "snake_case")]
pub enum ListingStep {
    Record(JobRecord),
    Exhausted,
}

pub struct SessionController {
    launcher: Arc<dyn BrowserLauncher>,
    handle: Option<Box<dyn BrowserHandle>>,
    /// Zero-based index of the entry currently displayed.
    position: usize,
    exhausted: bool,
    current: Option<JobRecord>,
    summary: Option<String>,
    /// Where the latest record is dumped as JSON after every extraction.
    debug_path: Option<PathBuf>,
}

impl SessionController {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, debug_path: Option<PathBuf>) -> Self {
        Self {
            launcher,
            handle: None,
            position: 0,
            exhausted: false,
            current: None,
            summary: None,
            debug_path,
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn current(&self) -> Option<&JobRecord> {
        self.current.as_ref()
    }

    pub fn cached_summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Caches the summary of the current record until the next record replaces it.
    pub fn cache_summary(&mut self, summary: String) {
        if self.current.is_some() {
            self.summary = Some(summary);
        }
    }

    pub async fn start(&mut self, query: &str, location: &str) -> Result<ListingStep, SessionError> {
        if let Err(e) = self.close().await {
            warn!("Previous browser handle failed to close cleanly: {e}");
        }

        info!("Starting job search: query={query:?} location={location:?}");
        let mut handle = self.launcher.launch().await?;

        if let Err(e) = handle.open_search(query, location).await {
            release(handle.as_mut()).await;
            return Err(e.into());
        }
        self.handle = Some(handle);

        self.extract_at(0).await
    }

    pub async fn advance(&mut self) -> Result<ListingStep, SessionError> {
        if self.handle.is_none() {
            return Err(SessionError::PreconditionFailed(
                "advance requires an open job search",
            ));
        }
        if self.exhausted {
            return Ok(ListingStep::Exhausted);
        }
        self.extract_at(self.position + 1).await
    }

    pub async fn close(&mut self) -> Result<(), SessionError> {
        self.position = 0;
        self.exhausted = false;
        self.current = None;
        self.summary = None;

        let Some(mut handle) = self.handle.take() else {
            return Ok(());
        };
        handle.close().await?;
        info!("Browser handle released");
        Ok(())
    }

    async fn extract_at(&mut self, index: usize) -> Result<ListingStep, SessionError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(SessionError::PreconditionFailed("no open browser handle"));
        };

        match handle.extract_entry(index).await {
            Ok(Some(raw)) => {
                let record = JobRecord::from(raw);
                debug!("Extracted listing entry {index}: {}", record.job_title);
                self.position = index;
                self.summary = None;
                write_debug_artifact(self.debug_path.as_deref(), &record).await;
                self.current = Some(record.clone());
                Ok(ListingStep::Record(record))
            }
            Ok(None) => {
                info!("Listing exhausted after {index} entries");
                self.exhausted = true;
                Ok(ListingStep::Exhausted)
            }
            Err(e) => {
                if let Some(mut handle) = self.handle.take() {
                    release(handle.as_mut()).await;
                }
                self.current = None;
                self.summary = None;
                Err(e.into())
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!("Session controller dropped with an open browser handle");
        }
    }
}

/// Overwrites the debug artifact with `record` as flat JSON. Failures are logged only.
async fn write_debug_artifact(path: Option<&Path>, record: &JobRecord) {
    let Some(path) = path else {
        return;
    };
    let result = match serde_json::to_vec_pretty(record) {
        Ok(bytes) => tokio::fs::write(path, bytes).await.map_err(anyhow::Error::from),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        warn!("Failed to write job debug artifact {}: {e}", path.display());
    }
}

/// Closes a handle on a failure path; the original error is what the caller sees.
async fn release(handle: &mut dyn BrowserHandle) {
    if let Err(e) = handle.close().await {
        warn!("Failed to release browser handle after error: {e}");
    }
}
