//! Router tests driven through `tower::ServiceExt::oneshot` with an in-process
//! provider and database.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use heavylifter_api::state::{AppState, model_from_provider};
use heavylifter_api::build_router;
use heavylifter_core::chain::SqlAnswerChain;
use heavylifter_core::chat::ChatService;
use heavylifter_core::llm::box_provider::BoxLlmProvider;
use heavylifter_core::llm::provider::LlmProvider;
use heavylifter_core::sql::SqlDatabase;
use heavylifter_types::config::AppConfig;
use heavylifter_types::error::SqlError;
use heavylifter_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use heavylifter_types::sql::{Dialect, QueryResult, SqlValue};

/// Replies with queued strings, or fails every call when `replies` is `None`.
struct QueuedProvider {
    replies: Option<Mutex<VecDeque<String>>>,
}

impl QueuedProvider {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Some(Mutex::new(replies.iter().map(|r| r.to_string()).collect())),
        }
    }

    fn unauthorized() -> Self {
        Self { replies: None }
    }
}

impl LlmProvider for QueuedProvider {
    fn name(&self) -> &str {
        "queued"
    }

    fn model(&self) -> &str {
        "queued-model"
    }

    fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let result = match &self.replies {
            None => Err(LlmError::AuthenticationFailed),
            Some(replies) => replies
                .lock()
                .unwrap()
                .pop_front()
                .map(|content| CompletionResponse {
                    id: "resp-1".to_string(),
                    content,
                    model: "queued-model".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 5,
                        output_tokens: 5,
                    },
                })
                .ok_or_else(|| LlmError::Provider {
                    message: "no reply queued".to_string(),
                }),
        };
        async move { result }
    }
}

/// Single-table database whose every query returns `[(3,)]`.
struct CountDatabase;

impl SqlDatabase for CountDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn usable_table_names(&self) -> impl Future<Output = Result<Vec<String>, SqlError>> + Send {
        async { Ok(vec!["ttd_deal".to_string()]) }
    }

    fn table_info(
        &self,
        _table_names: Option<&[String]>,
    ) -> impl Future<Output = Result<String, SqlError>> + Send {
        async { Ok("CREATE TABLE ttd_deal (id INTEGER PRIMARY KEY, status TEXT)".to_string()) }
    }

    fn run(&self, _sql: &str) -> impl Future<Output = Result<QueryResult, SqlError>> + Send {
        async {
            Ok(QueryResult {
                columns: vec!["n".to_string()],
                rows: vec![vec![SqlValue::Number("3".to_string())]],
            })
        }
    }
}

fn app(provider: QueuedProvider, with_graphql: bool) -> Router {
    app_with_config(provider, with_graphql, &AppConfig::default())
}

fn app_with_config(provider: QueuedProvider, with_graphql: bool, config: &AppConfig) -> Router {
    let model = model_from_provider(BoxLlmProvider::new(provider), config);
    let lifter = SqlAnswerChain::new(model.clone(), Dialect::Sqlite, 5).unwrap();
    let graphql = with_graphql
        .then(|| SqlAnswerChain::graphql(model, 5, "type Deal { id: ID! }").unwrap());
    let service = ChatService::new(Arc::new(CountDatabase), lifter, graphql)
        .with_max_sessions(config.server.max_sessions);
    build_router(AppState::new(service))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, body: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Start a session on `page` and return its path.
async fn start_session(app: &Router, page: &str) -> String {
    let response = get(app, page).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

fn session_id(path: &str) -> &str {
    path.rsplit('/').next().unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let app = app(QueuedProvider::new(&[]), false);
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn home_page_links_chat_pages() {
    let app = app(QueuedProvider::new(&[]), true);
    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("<h1>Heavy Lifter</h1>"));
    assert!(html.contains("href=\"/lifter\""));
    assert!(html.contains("href=\"/graphql\""));
}

#[tokio::test]
async fn new_session_renders_empty_chat() {
    let app = app(QueuedProvider::new(&[]), false);
    let path = start_session(&app, "/lifter").await;
    assert!(path.starts_with("/lifter/"));

    let response = get(&app, &path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Ask me anything! I will do the heavy lifting for you"));
    assert!(html.contains(&format!("action=\"{path}\"")));
    assert!(!html.contains("class=\"message user\""));
}

#[tokio::test]
async fn graphql_page_without_schema_is_not_found() {
    let app = app(QueuedProvider::new(&[]), false);
    let response = get(&app, "/graphql").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_session_and_page_are_not_found() {
    let app = app(QueuedProvider::new(&[]), false);

    let response = get(&app, "/lifter/0190a5b2-7c1e-7d3f-8a4b-5c6d7e8f9a0b").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Session not found"));

    assert_eq!(get(&app, "/lifter/not-a-uuid").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/dashboard").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_page_loads_evict_oldest_sessions() {
    let mut config = AppConfig::default();
    config.server.max_sessions = 3;
    let app = app_with_config(QueuedProvider::new(&[]), false, &config);

    let mut paths = Vec::new();
    for _ in 0..10 {
        paths.push(start_session(&app, "/lifter").await);
    }

    let first = &paths[0];
    assert_eq!(get(&app, first).await.status(), StatusCode::NOT_FOUND);
    let response = get(&app, &format!("/api/v1/sessions/{}", session_id(first))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for path in &paths[7..] {
        assert_eq!(get(&app, path).await.status(), StatusCode::OK);
    }
    for path in &paths[..7] {
        assert_eq!(get(&app, path).await.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn session_is_scoped_to_its_page() {
    let app = app(QueuedProvider::new(&[]), true);
    let path = start_session(&app, "/lifter").await;
    let other = format!("/graphql/{}", session_id(&path));
    assert_eq!(get(&app, &other).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn prompt_is_answered_and_recorded() {
    let app = app(
        QueuedProvider::new(&["SELECT COUNT(*) AS n FROM ttd_deal", "There are 3 deals."]),
        false,
    );
    let path = start_session(&app, "/lifter").await;

    let response = post_form(&app, &path, "prompt=How+many+deals%3F").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], path.as_str());

    let html = body_string(get(&app, &path).await).await;
    assert!(html.contains("How many deals?"));
    assert!(html.contains("There are 3 deals."));
    assert!(html.contains("SELECT COUNT(*) AS n FROM ttd_deal"));

    let response = get(&app, &format!("/api/v1/sessions/{}", session_id(&path))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let turns = body["data"]["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[0]["content"], "How many deals?");
    assert_eq!(turns[1]["role"], "assistant");
    assert_eq!(
        turns[1]["content"],
        "There are 3 deals.\n\n```sql\nSELECT COUNT(*) AS n FROM ttd_deal\n```"
    );
}

#[tokio::test]
async fn transcript_content_is_escaped() {
    let app = app(QueuedProvider::new(&["SELECT 1", "<b>done</b>"]), false);
    let path = start_session(&app, "/lifter").await;

    let response = post_form(&app, &path, "prompt=%3Cscript%3Ealert(1)%3C%2Fscript%3E").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = body_string(get(&app, &path).await).await;
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<b>done</b>"));
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let app = app(QueuedProvider::new(&[]), false);
    let path = start_session(&app, "/lifter").await;

    let response = post_form(&app, &path, "prompt=+++").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_string(get(&app, &path).await).await;
    assert!(!html.contains("class=\"message user\""));
}

#[tokio::test]
async fn llm_failure_leaves_transcript_unchanged() {
    let app = app(QueuedProvider::unauthorized(), false);
    let path = start_session(&app, "/lifter").await;

    let response = post_form(&app, &path, "prompt=How+many+deals%3F").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let html = body_string(response).await;
    assert!(html.contains("502"));

    let response = get(&app, &format!("/api/v1/sessions/{}", session_id(&path))).await;
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["data"]["turns"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn api_ask_returns_answer() {
    let app = app(
        QueuedProvider::new(&["```sql\nSELECT COUNT(*) AS n FROM ttd_deal\n```", "Three."]),
        false,
    );
    let response = post_json(
        &app,
        "/api/v1/ask",
        serde_json::json!({"question": "How many deals?"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["data"]["question"], "How many deals?");
    assert_eq!(body["data"]["query"], "SELECT COUNT(*) AS n FROM ttd_deal");
    assert_eq!(body["data"]["answer"], "Three.");
    assert_eq!(
        body["data"]["result"]["rows"][0][0],
        serde_json::json!({"type": "number", "value": "3"})
    );
    assert!(body["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn api_errors_use_envelope() {
    let app = app(QueuedProvider::new(&[]), false);

    let response = post_json(&app, "/api/v1/ask", serde_json::json!({"question": ""})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

    let response = get(&app, "/api/v1/sessions/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/api/v1/sessions/0190a5b2-7c1e-7d3f-8a4b-5c6d7e8f9a0b").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["errors"][0]["code"], "NOT_FOUND");
}
