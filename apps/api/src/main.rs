mod accounts;
mod config;
mod cv;
mod db;
mod errors;
mod layout;
mod models;
mod profile;
mod routes;
mod session;
mod state;
mod summary;

use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::create_pool;
use crate::layout::{default_page_config, DocumentLayoutEngine};
use crate::profile::store::PgProfileStore;
use crate::routes::build_router;
use crate::session::webdriver::WebDriverLauncher;
use crate::session::SessionRegistry;
use crate::state::AppState;
use crate::summary::LlmClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RoleReady API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize summary client
    let summarizer = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("Summary client initialized (model: {})", summary::MODEL);

    // Browser sessions go through chromedriver
    let launcher = Arc::new(WebDriverLauncher::new(
        config.webdriver_url.clone(),
        config.listing_site.clone(),
        config.listing_selectors.clone(),
    ));
    info!(
        "WebDriver endpoint {} (search page {})",
        config.webdriver_url, config.listing_site.search_url
    );
    let sessions = SessionRegistry::new(launcher, Some(config.job_debug_path.clone()));
    let idle_pruner = (config.session_idle_secs > 0).then(|| {
        info!("Sessions expire after {}s idle", config.session_idle_secs);
        sessions.spawn_idle_pruner(Duration::from_secs(config.session_idle_secs))
    });

    // Single-page CV layout
    let page_config = default_page_config(config.glyph_width_factor);
    page_config
        .validate()
        .map_err(|e| anyhow!("Invalid page configuration: {e}"))?;
    info!(
        "Layout page config: {}x{}pt, wrap width {} chars",
        page_config.page_width_pt,
        page_config.page_height_pt,
        page_config.wrap_width_chars(0.0)
    );

    // Build app state
    let state = AppState {
        profiles: Arc::new(PgProfileStore::new(db.clone())),
        db,
        config: config.clone(),
        summarizer,
        sessions: sessions.clone(),
        layout: Arc::new(DocumentLayoutEngine::new(page_config)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pruner) = idle_pruner {
        pruner.abort();
    }

    // Browser handles are external processes; release them before exiting.
    info!("Closing {} open sessions", sessions.len());
    sessions.close_all().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
