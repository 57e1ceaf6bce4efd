use super::*;
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{domain::Category, error::ApiError};
use std::collections::HashMap;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct Captured {
    method: &'static str,
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct ServerState {
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl ServerState {
    async fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.captured.lock().await.push(Captured {
            method,
            path,
            authorization,
            body,
        });
    }

    async fn last(&self) -> Captured {
        self.captured
            .lock()
            .await
            .last()
            .cloned()
            .expect("a request was captured")
    }
}

fn sample_record(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Rust meetup",
        "date": "2026-11-12T00:00:00Z",
        "time": "18:30",
        "location": "Community hall",
        "eventType": "IN_PERSON",
        "category": "TECHNOLOGY",
        "price": 5.0,
        "capacity": 40,
        "tags": "rust,meetup"
    })
}

async fn handle_create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let title = body["title"].as_str().unwrap_or_default().to_string();
    state.record("POST", "/api/events".to_string(), &headers, body).await;
    if title == "Duplicate" {
        return (
            StatusCode::CONFLICT,
            Json(ApiError::new("An event with this title already exists")),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(json!({ "id": 101 }))).into_response()
}

async fn handle_update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state
        .record("PATCH", format!("/api/events/{id}"), &headers, body)
        .await;
    Json(json!({ "id": id }))
}

async fn handle_get(Path(id): Path<String>) -> impl IntoResponse {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, "gone").into_response();
    }
    Json(sample_record(&id)).into_response()
}

async fn handle_list(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    state
        .record("GET", "/api/events".to_string(), &headers, json!(query))
        .await;
    Json(json!([sample_record("1"), sample_record("2")]))
}

async fn handle_invite(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let invalid = body["email"] == "blocked@example.com";
    state
        .record("POST", format!("/api/events/{id}/guests"), &headers, body)
        .await;
    if invalid {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn spawn_api_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/events", post(handle_create).get(handle_list))
        .route("/api/events/:id", patch(handle_update).get(handle_get))
        .route("/api/events/:id/guests", post(handle_invite))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), state)
}

fn sample_payload(title: &str) -> EventPayload {
    let mut wizard = EventWizard::create();
    wizard.update_field(DraftPatch {
        title: Some(title.to_string()),
        date: Some("2026-11-12".to_string()),
        time: Some("18:30".to_string()),
        location: Some("Community hall".to_string()),
        capacity: Some("40".to_string()),
        tags: Some(vec!["Rust".to_string(), "meetup".to_string()]),
        ..Default::default()
    });
    crate::wizard::build_payload(wizard.draft()).expect("payload")
}

#[test]
fn base_url_is_treated_as_a_directory() {
    let client = ApiClient::new("http://localhost:3000/api", Arc::new(Anonymous)).expect("client");
    assert_eq!(client.base_url().as_str(), "http://localhost:3000/api/");
    assert!(ApiClient::new("not a url", Arc::new(Anonymous)).is_err());
}

#[tokio::test]
async fn create_event_posts_payload_with_bearer_token() {
    let (base_url, state) = spawn_api_server().await;
    let client = ApiClient::new(&base_url, Arc::new(StaticToken::new("secret-token"))).expect("client");

    let id = client
        .create_event(&sample_payload("Rust meetup"))
        .await
        .expect("create");
    assert_eq!(id, EventId::new("101"));

    let captured = state.last().await;
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.authorization.as_deref(), Some("Bearer secret-token"));
    assert_eq!(captured.body["title"], "Rust meetup");
    assert_eq!(captured.body["capacity"], 40);
    assert_eq!(captured.body["tags"], "rust,meetup");
    assert_eq!(captured.body["eventType"], "IN_PERSON");
}

#[tokio::test]
async fn api_error_message_is_surfaced_verbatim() {
    let (base_url, _state) = spawn_api_server().await;
    let client = ApiClient::new(&base_url, Arc::new(Anonymous)).expect("client");

    let err = client
        .create_event(&sample_payload("Duplicate"))
        .await
        .expect_err("conflict");
    assert_eq!(err.to_string(), "An event with this title already exists");
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.code(), Some(shared::error::ErrorCode::Validation));
}

#[tokio::test]
async fn error_without_message_body_falls_back_to_status_reason() {
    let (base_url, _state) = spawn_api_server().await;
    let client = ApiClient::new(&base_url, Arc::new(Anonymous)).expect("client");

    let err = client
        .get_event(&EventId::new("missing"))
        .await
        .expect_err("not found");
    assert_eq!(err.to_string(), "Not Found");
    assert_eq!(err.code(), Some(shared::error::ErrorCode::NotFound));
}

#[tokio::test]
async fn session_token_changes_apply_to_later_requests() {
    let (base_url, state) = spawn_api_server().await;
    let tokens = Arc::new(SessionTokenStore::new());
    let client = ApiClient::new(&base_url, tokens.clone()).expect("client");

    client.list_events(&EventQuery::default()).await.expect("list");
    assert_eq!(state.last().await.authorization, None);

    tokens.set("first");
    assert!(tokens.is_signed_in());
    client.list_events(&EventQuery::default()).await.expect("list");
    assert_eq!(state.last().await.authorization.as_deref(), Some("Bearer first"));

    tokens.clear();
    client.list_events(&EventQuery::default()).await.expect("list");
    assert_eq!(state.last().await.authorization, None);
}

#[tokio::test]
async fn list_events_sends_filters_as_query() {
    let (base_url, state) = spawn_api_server().await;
    let client = ApiClient::new(&base_url, Arc::new(Anonymous)).expect("client");

    let events = client
        .list_events(&EventQuery {
            category: Some(Category::Technology),
            search: Some("rust".to_string()),
        })
        .await
        .expect("list");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].category, Category::Technology);

    let captured = state.last().await;
    assert_eq!(captured.body, json!({ "category": "TECHNOLOGY", "search": "rust" }));
}

#[tokio::test]
async fn invite_guest_posts_email_and_reports_rejections() {
    let (base_url, state) = spawn_api_server().await;
    let client = ApiClient::new(&base_url, Arc::new(Anonymous)).expect("client");
    let id = EventId::new("55");

    client
        .invite_guest(&id, "ada@example.com")
        .await
        .expect("invite");
    let captured = state.last().await;
    assert_eq!(captured.path, "/api/events/55/guests");
    assert_eq!(captured.body, json!({ "email": "ada@example.com" }));

    let err = client
        .invite_guest(&id, "blocked@example.com")
        .await
        .expect_err("rejected");
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn edit_wizard_prefills_and_submits_update() {
    let (base_url, state) = spawn_api_server().await;
    let client = ApiClient::new(&base_url, Arc::new(StaticToken::new("t"))).expect("client");

    let record = client.get_event(&EventId::new("77")).await.expect("get");
    let mut wizard = EventWizard::edit(&record);
    assert_eq!(wizard.draft().date, "2026-11-12");
    assert_eq!(wizard.draft().tags.join(), "rust,meetup");
    assert_eq!(wizard.draft().capacity, "40");

    wizard.update_field(DraftPatch {
        title: Some("Rust meetup #2".to_string()),
        ..Default::default()
    });
    assert!(wizard.go_to_step(crate::wizard::LAST_STEP));

    let mut completed = None;
    let outcome = wizard
        .submit(&client, |id| completed = Some(id.clone()))
        .await;
    assert_eq!(outcome, SubmitOutcome::Saved(EventId::new("77")));
    assert_eq!(completed, Some(EventId::new("77")));

    let captured = state.last().await;
    assert_eq!(captured.method, "PATCH");
    assert_eq!(captured.path, "/api/events/77");
    assert_eq!(captured.body["title"], "Rust meetup #2");
}

#[tokio::test]
async fn network_failure_during_submit_is_kept_as_submit_error() {
    // Bind then drop a listener so the port is known to refuse connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");

    let client = ApiClient::with_timeout(
        &format!("http://{addr}/api"),
        Arc::new(Anonymous),
        Duration::from_secs(2),
    )
    .expect("client");

    let mut wizard = EventWizard::create();
    wizard.update_field(DraftPatch {
        title: Some("Offline launch".to_string()),
        date: Some("2026-11-12".to_string()),
        time: Some("18:30".to_string()),
        location: Some("Somewhere".to_string()),
        ..Default::default()
    });
    assert!(wizard.validate_all());
    let step_before = wizard.current_step();

    let mut called = false;
    let outcome = wizard.submit(&client, |_| called = true).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert!(!called);
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.current_step(), step_before);
    let message = wizard.submit_error().expect("submit error");
    assert!(message.starts_with("request failed"), "unexpected: {message}");
    assert_eq!(wizard.mode(), &WizardMode::Create);
}
