//! W3C WebDriver backend for the browser seam (chromedriver by default).
//!
//! Listing extraction runs as one asynchronous script per entry, parameterized by
//! `ListingSelectors`, so site-specific DOM knowledge stays in configuration.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::models::job::RawPosting;
use crate::session::adapter::{AdapterError, BrowserHandle, BrowserLauncher};

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Chrome flags that keep popups, notifications and automation banners out of the way.
const CHROME_ARGS: &[&str] = &[
    "--disable-popup-blocking",
    "--disable-notifications",
    "--disable-extensions",
    "--disable-infobars",
    "--disable-web-security",
    "--disable-blink-features=AutomationControlled",
];

/// Arguments: [index, selectors, done]. Resolves with a posting object or null.
const EXTRACT_ENTRY_SCRIPT: &str = r#"
const [index, sel, done] = arguments;
const text = (s) => {
  if (!s) return null;
  const el = document.querySelector(s);
  return el ? el.innerText : null;
};
const href = (s) => {
  if (!s) return null;
  const el = document.querySelector(s);
  return el ? (el.href || el.getAttribute('href')) : null;
};
const extract = (cards) => {
  const card = cards[index];
  card.scrollIntoView({ block: 'center' });
  card.click();
  setTimeout(() => done({
    title: text(sel.title),
    company: text(sel.company),
    location: text(sel.location),
    employment_type: text(sel.employment_type),
    salary: text(sel.salary),
    description: text(sel.description),
    application_link: href(sel.application_link),
    company_rating: text(sel.company_rating),
  }), sel.settle_ms);
};
let cards = document.querySelectorAll(sel.card);
if (index < cards.length) {
  extract(cards);
} else if (cards.length === 0) {
  done(null);
} else {
  cards[cards.length - 1].scrollIntoView({ block: 'end' });
  setTimeout(() => {
    cards = document.querySelectorAll(sel.card);
    if (index < cards.length) { extract(cards); } else { done(null); }
  }, sel.settle_ms);
}
"#;

/// Where the search is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSite {
    pub search_url: String,
    pub query_param: String,
    pub location_param: String,
}

impl Default for ListingSite {
    fn default() -> Self {
        Self {
            search_url: "https://www.glassdoor.com/Job/jobs.htm".to_string(),
            query_param: "sc.keyword".to_string(),
            location_param: "locKeyword".to_string(),
        }
    }
}

impl ListingSite {
    pub fn search_url_for(&self, query: &str, location: &str) -> Result<Url, AdapterError> {
        let mut url = Url::parse(&self.search_url)
            .map_err(|e| AdapterError::InvalidUrl(format!("{}: {e}", self.search_url)))?;
        url.query_pairs_mut()
            .append_pair(&self.query_param, query)
            .append_pair(&self.location_param, location);
        Ok(url)
    }
}

/// CSS selectors for the listing cards and the detail pane fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    pub card: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    pub application_link: String,
    pub company_rating: String,
    /// Milliseconds to wait after clicking a card before reading the detail pane.
    pub settle_ms: u64,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: "li[data-test=\"jobListing\"]".to_string(),
            title: "[data-test=\"job-title\"]".to_string(),
            company: "[data-test=\"employer-name\"]".to_string(),
            location: "[data-test=\"location\"]".to_string(),
            employment_type: "[data-test=\"employment-type\"]".to_string(),
            salary: "[data-test=\"detailSalary\"]".to_string(),
            description: "[class*=\"JobDetails_jobDescription\"]".to_string(),
            application_link: "[data-test=\"applyButton\"] a".to_string(),
            company_rating: "[data-test=\"rating-info\"]".to_string(),
            settle_ms: 1500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebDriverReply<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct WebDriverFailure {
    error: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Starts one chromedriver session per launch.
pub struct WebDriverLauncher {
    client: Client,
    base_url: String,
    site: Arc<ListingSite>,
    selectors: Arc<ListingSelectors>,
}

impl WebDriverLauncher {
    pub fn new(base_url: String, site: ListingSite, selectors: ListingSelectors) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            site: Arc::new(site),
            selectors: Arc::new(selectors),
        }
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, AdapterError> {
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": CHROME_ARGS }
                }
            }
        });
        let created: NewSession = send_command(
            &self.client,
            Method::POST,
            &format!("{}/session", self.base_url),
            Some(capabilities),
        )
        .await?;

        info!("WebDriver session {} started", created.session_id);

        Ok(Box::new(WebDriverHandle {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session_id: Some(created.session_id),
            site: Arc::clone(&self.site),
            selectors: Arc::clone(&self.selectors),
        }))
    }
}

/// A live chromedriver session. Dropping it while open schedules a release.
pub struct WebDriverHandle {
    client: Client,
    base_url: String,
    session_id: Option<String>,
    site: Arc<ListingSite>,
    selectors: Arc<ListingSelectors>,
}

impl WebDriverHandle {
    fn session_url(&self, suffix: &str) -> Result<String, AdapterError> {
        let id = self.session_id.as_deref().ok_or(AdapterError::Closed)?;
        Ok(format!("{}/session/{id}{suffix}", self.base_url))
    }
}

#[async_trait]
impl BrowserHandle for WebDriverHandle {
    async fn open_search(&mut self, query: &str, location: &str) -> Result<(), AdapterError> {
        let url = self.site.search_url_for(query, location)?;
        debug!("Navigating to {url}");
        let _: Value = send_command(
            &self.client,
            Method::POST,
            &self.session_url("/url")?,
            Some(json!({ "url": url.as_str() })),
        )
        .await?;
        Ok(())
    }

    async fn extract_entry(&mut self, index: usize) -> Result<Option<RawPosting>, AdapterError> {
        let selectors = serde_json::to_value(self.selectors.as_ref())?;
        let value: Value = send_command(
            &self.client,
            Method::POST,
            &self.session_url("/execute/async")?,
            Some(json!({ "script": EXTRACT_ENTRY_SCRIPT, "args": [index, selectors] })),
        )
        .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn close(&mut self) -> Result<(), AdapterError> {
        let Some(id) = self.session_id.as_deref() else {
            return Ok(());
        };
        let url = format!("{}/session/{id}", self.base_url);
        // Cleared only once the driver confirms; otherwise `Drop` still releases it.
        let _: Value = send_command(&self.client, Method::DELETE, &url, None).await?;
        info!("WebDriver session {id} closed");
        self.session_id = None;
        Ok(())
    }
}

impl Drop for WebDriverHandle {
    fn drop(&mut self) {
        let Some(id) = self.session_id.take() else {
            return;
        };
        warn!("WebDriver session {id} dropped while open; releasing");
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available to release WebDriver session {id}");
            return;
        };
        let client = self.client.clone();
        let url = format!("{}/session/{id}", self.base_url);
        runtime.spawn(async move {
            if let Err(e) = client.delete(&url).send().await {
                warn!("Failed to release WebDriver session: {e}");
            }
        });
    }
}

async fn send_command<T: DeserializeOwned>(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<T, AdapterError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<WebDriverReply<WebDriverFailure>>(&text)
            .map(|f| format!("{}: {}", f.value.error, f.value.message))
            .unwrap_or(text);
        return Err(AdapterError::WebDriver {
            status: status.as_u16(),
            message,
        });
    }

    let reply: WebDriverReply<T> = serde_json::from_str(&text)?;
    Ok(reply.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query_and_location() {
        let site = ListingSite {
            search_url: "https://jobs.example.com/search".to_string(),
            query_param: "q".to_string(),
            location_param: "l".to_string(),
        };
        let url = site.search_url_for("Software Engineer", "São Paulo").unwrap();
        assert_eq!(
            url.as_str(),
            "https://jobs.example.com/search?q=Software+Engineer&l=S%C3%A3o+Paulo"
        );
    }

    #[test]
    fn test_invalid_search_url_is_reported() {
        let site = ListingSite {
            search_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            site.search_url_for("a", "b"),
            Err(AdapterError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_partial_selector_override_keeps_defaults() {
        let selectors: ListingSelectors =
            serde_json::from_str(r#"{"card": ".job", "settle_ms": 10}"#).unwrap();
        assert_eq!(selectors.card, ".job");
        assert_eq!(selectors.settle_ms, 10);
        assert_eq!(selectors.title, ListingSelectors::default().title);
    }

    #[test]
    fn test_webdriver_failure_body_parses() {
        let body = r#"{"value": {"error": "no such window", "message": "window closed", "stacktrace": ""}}"#;
        let reply: WebDriverReply<WebDriverFailure> = serde_json::from_str(body).unwrap();
        assert_eq!(reply.value.error, "no such window");
    }

    #[tokio::test]
    async fn test_closed_handle_close_is_noop() {
        let mut handle = WebDriverHandle {
            client: Client::new(),
            base_url: DEFAULT_WEBDRIVER_URL.to_string(),
            session_id: None,
            site: Arc::new(ListingSite::default()),
            selectors: Arc::new(ListingSelectors::default()),
        };
        assert!(handle.close().await.is_ok());
        assert!(matches!(
            handle.extract_entry(0).await,
            Err(AdapterError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_failed_close_keeps_session_for_release() {
        let mut handle = WebDriverHandle {
            client: Client::new(),
            base_url: "http://127.0.0.1:1".to_string(),
            session_id: Some("abc".to_string()),
            site: Arc::new(ListingSite::default()),
            selectors: Arc::new(ListingSelectors::default()),
        };
        assert!(handle.close().await.is_err());
        assert_eq!(handle.session_id.as_deref(), Some("abc"));

        handle.session_id = None;
    }
}
