use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::layout::DocumentLayoutEngine;
use crate::profile::store::ProfileStore;
use crate::session::SessionRegistry;
use crate::summary::SummaryService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub summarizer: Arc<dyn SummaryService>,
    /// Profile entities; `PgProfileStore` over `db` in production.
    pub profiles: Arc<dyn ProfileStore>,
    pub sessions: SessionRegistry,
    pub layout: Arc<DocumentLayoutEngine>,
}
