use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::profile::skills::DEFAULT_MAX_SKILLS;
use crate::session::webdriver::{ListingSelectors, ListingSite, DEFAULT_WEBDRIVER_URL};

pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub webdriver_url: String,
    pub listing_site: ListingSite,
    pub listing_selectors: ListingSelectors,
    /// Overwritten on every CV generation.
    pub cv_output_path: PathBuf,
    /// Latest scraped posting as JSON, overwritten on every search step.
    pub job_debug_path: PathBuf,
    pub max_skills: usize,
    /// Average glyph width as a fraction of font size, used for word wrap.
    pub glyph_width_factor: f32,
    /// Sessions unused for this long are torn down. Zero disables expiry.
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut listing_site = ListingSite::default();
        if let Ok(url) = std::env::var("JOB_SEARCH_URL") {
            listing_site.search_url = url;
        }

        let listing_selectors = match std::env::var("LISTING_SELECTORS") {
            Ok(raw) => serde_json::from_str(&raw)
                .context("LISTING_SELECTORS must be a JSON object of CSS selectors")?,
            Err(_) => ListingSelectors::default(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            webdriver_url: std::env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string()),
            listing_site,
            listing_selectors,
            cv_output_path: std::env::var("CV_OUTPUT_PATH")
                .unwrap_or_else(|_| "cv.pdf".to_string())
                .into(),
            job_debug_path: std::env::var("JOB_DEBUG_PATH")
                .unwrap_or_else(|_| "job_description.json".to_string())
                .into(),
            max_skills: parse_env("MAX_SKILLS", DEFAULT_MAX_SKILLS)
                .context("MAX_SKILLS must be a positive integer")?,
            glyph_width_factor: parse_env("GLYPH_WIDTH_FACTOR", 0.5)
                .context("GLYPH_WIDTH_FACTOR must be a number")?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)
                .context("SESSION_IDLE_SECS must be a whole number of seconds")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}
