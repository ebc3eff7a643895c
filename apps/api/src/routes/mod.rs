pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::cv::handlers as cv;
use crate::profile::handlers as profile;
use crate::session::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/accounts", post(accounts::handle_create_account))
        // Session lifecycle
        .route("/api/v1/sessions", post(sessions::handle_open_session))
        .route(
            "/api/v1/sessions/:id",
            delete(sessions::handle_teardown_session),
        )
        .route("/api/v1/sessions/:id/login", post(sessions::handle_login))
        .route("/api/v1/sessions/:id/logout", post(sessions::handle_logout))
        // Job search
        .route(
            "/api/v1/sessions/:id/jobs",
            delete(sessions::handle_close_search),
        )
        .route(
            "/api/v1/sessions/:id/jobs/search",
            post(sessions::handle_search),
        )
        .route("/api/v1/sessions/:id/jobs/next", post(sessions::handle_next))
        .route(
            "/api/v1/sessions/:id/jobs/summary",
            post(sessions::handle_summarize_job),
        )
        .route(
            "/api/v1/sessions/:id/jobs/save",
            post(sessions::handle_save_job),
        )
        .route(
            "/api/v1/sessions/:id/jobs/saved",
            get(sessions::handle_saved_jobs),
        )
        // Profile
        .route(
            "/api/v1/sessions/:id/drafts",
            get(profile::handle_list_drafts).post(profile::handle_add_draft),
        )
        .route(
            "/api/v1/sessions/:id/drafts/commit",
            post(profile::handle_commit_drafts),
        )
        .route(
            "/api/v1/sessions/:id/drafts/:draft_id",
            delete(profile::handle_remove_draft),
        )
        .route(
            "/api/v1/sessions/:id/skills",
            put(profile::handle_replace_skills),
        )
        .route(
            "/api/v1/sessions/:id/profile",
            get(profile::handle_get_profile),
        )
        // CV
        .route("/api/v1/sessions/:id/cv", post(cv::handle_generate_cv))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::layout::{default_page_config, DocumentLayoutEngine};
    use crate::profile::store::tests::MemoryProfileStore;
    use crate::session::controller::tests::FakeLauncher;
    use crate::session::webdriver::{ListingSelectors, ListingSite};
    use crate::session::SessionRegistry;
    use crate::summary::{SummaryError, SummaryService, WordBudget};

    #[derive(Default)]
    struct CountingSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SummaryService for CountingSummarizer {
        async fn summarize(&self, text: &str, _budget: WordBudget) -> Result<String, SummaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Summary of: {text}"))
        }
    }

    struct Harness {
        state: AppState,
        summarizer: Arc<CountingSummarizer>,
        _dir: tempfile::TempDir,
    }

    fn harness(titles: &[&str]) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: "postgres://localhost/roleready_test".to_string(),
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            listing_site: ListingSite::default(),
            listing_selectors: ListingSelectors::default(),
            cv_output_path: dir.path().join("cv.pdf"),
            job_debug_path: dir.path().join("job_description.json"),
            max_skills: 10,
            glyph_width_factor: 0.5,
            session_idle_secs: 0,
        };
        // Never connects: the routes exercised here fail before touching the database.
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let summarizer = Arc::new(CountingSummarizer::default());
        let state = AppState {
            db,
            sessions: SessionRegistry::new(
                Arc::new(FakeLauncher::with_titles(titles)),
                Some(config.job_debug_path.clone()),
            ),
            layout: Arc::new(DocumentLayoutEngine::new(default_page_config(
                config.glyph_width_factor,
            ))),
            config,
            summarizer: summarizer.clone(),
            profiles: Arc::new(MemoryProfileStore::default()),
        };
        Harness {
            state,
            summarizer,
            _dir: dir,
        }
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<&str>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        build_router(state.clone())
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn open_session(state: &AppState) -> Uuid {
        let response = send(state, "POST", "/api/v1/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        body["session_id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(&[]);
        let response = send(&h.state, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "roleready-api");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let h = harness(&[]);
        let uri = format!("/api/v1/sessions/{}/jobs/next", Uuid::new_v4());
        let response = send(&h.state, "POST", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_next_without_search_is_412() {
        let h = harness(&["A"]);
        let id = open_session(&h.state).await;
        let response = send(&h.state, "POST", &format!("/api/v1/sessions/{id}/jobs/next"), None).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn test_search_walks_listing_to_exhaustion() {
        let h = harness(&["Rust Engineer", "Go Engineer"]);
        let id = open_session(&h.state).await;

        let search = send(
            &h.state,
            "POST",
            &format!("/api/v1/sessions/{id}/jobs/search"),
            Some(r#"{"query": "Software Engineer", "location": "Remote"}"#),
        )
        .await;
        assert_eq!(search.status(), StatusCode::OK);
        let body = json_body(search).await;
        assert_eq!(body["status"], "record");
        assert_eq!(body["job"]["job_title"], "Rust Engineer");

        let next = json_body(send(&h.state, "POST", &format!("/api/v1/sessions/{id}/jobs/next"), None).await).await;
        assert_eq!(next["job"]["job_title"], "Go Engineer");

        let done = send(&h.state, "POST", &format!("/api/v1/sessions/{id}/jobs/next"), None).await;
        assert_eq!(done.status(), StatusCode::OK);
        assert_eq!(json_body(done).await, serde_json::json!({ "status": "exhausted" }));

        let artifact = std::fs::read_to_string(&h.state.config.job_debug_path).unwrap();
        assert!(artifact.contains("Go Engineer"));
    }

    #[tokio::test]
    async fn test_summary_is_cached_until_next_record() {
        let h = harness(&["Rust Engineer", "Go Engineer"]);
        let id = open_session(&h.state).await;
        send(
            &h.state,
            "POST",
            &format!("/api/v1/sessions/{id}/jobs/search"),
            Some(r#"{"query": "engineer", "location": "Remote"}"#),
        )
        .await;
        let uri = format!("/api/v1/sessions/{id}/jobs/summary");

        let first = json_body(send(&h.state, "POST", &uri, None).await).await;
        assert_eq!(first["cached"], false);
        assert_eq!(first["summary"], "Summary of: Rust Engineer role description");
        let second = json_body(send(&h.state, "POST", &uri, None).await).await;
        assert_eq!(second["cached"], true);
        assert_eq!(h.summarizer.calls.load(Ordering::SeqCst), 1);

        send(&h.state, "POST", &format!("/api/v1/sessions/{id}/jobs/next"), None).await;
        let third = json_body(send(&h.state, "POST", &uri, None).await).await;
        assert_eq!(third["cached"], false);
        assert_eq!(h.summarizer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_summary_without_posting_is_412() {
        let h = harness(&[]);
        let id = open_session(&h.state).await;
        let response = send(&h.state, "POST", &format!("/api/v1/sessions/{id}/jobs/summary"), None).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn test_login_required_actions_are_412_for_anonymous_sessions() {
        let h = harness(&["A"]);
        let id = open_session(&h.state).await;
        for (method, path) in [
            ("POST", "cv"),
            ("POST", "jobs/save"),
            ("GET", "jobs/saved"),
            ("POST", "drafts/commit"),
            ("GET", "profile"),
        ] {
            let response = send(&h.state, method, &format!("/api/v1/sessions/{id}/{path}"), None).await;
            assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED, "{method} {path}");
        }
    }

    #[tokio::test]
    async fn test_draft_add_list_remove() {
        let h = harness(&[]);
        let id = open_session(&h.state).await;
        let uri = format!("/api/v1/sessions/{id}/drafts");

        let added = send(
            &h.state,
            "POST",
            &uri,
            Some(r#"{"kind": "certification", "certificate": "CKA"}"#),
        )
        .await;
        assert_eq!(added.status(), StatusCode::CREATED);
        let draft_id = json_body(added).await["draft_id"].as_u64().unwrap();

        let list = json_body(send(&h.state, "GET", &uri, None).await).await;
        assert_eq!(list["drafts"][0]["id"], draft_id);
        assert_eq!(list["drafts"][0]["kind"], "certification");
        assert_eq!(list["drafts"][0]["certificate"], "CKA");

        let removed = send(&h.state, "DELETE", &format!("{uri}/{draft_id}"), None).await;
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);
        let gone = send(&h.state, "DELETE", &format!("{uri}/{draft_id}"), None).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_400() {
        let h = harness(&[]);
        let id = open_session(&h.state).await;
        let response = send(
            &h.state,
            "POST",
            &format!("/api/v1/sessions/{id}/drafts"),
            Some(r#"{"kind": "certification", "certificate": "  "}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_teardown_removes_session() {
        let h = harness(&["A"]);
        let id = open_session(&h.state).await;
        let uri = format!("/api/v1/sessions/{id}");
        assert_eq!(send(&h.state, "DELETE", &uri, None).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(send(&h.state, "DELETE", &uri, None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(h.state.sessions.len(), 0);
    }
}
