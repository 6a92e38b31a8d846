#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use standup_web::api::Gateway;
use standup_web::session::CookieSettings;
use standup_web::{router, AppState};

/// How long `/slow` stalls. Tests that hit it use a shorter gateway timeout.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

pub type Calls = Arc<Mutex<Vec<Call>>>;

/// In-process stand-in for the standup REST API.
pub struct Upstream {
    pub base_url: String,
    calls: Calls,
}

impl Upstream {
    pub async fn spawn() -> Result<Self> {
        let calls: Calls = Arc::default();
        let app = mock_routes().layer(from_fn_with_state(calls.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            calls,
        })
    }

    pub fn gateway(&self, timeout: Duration) -> Gateway {
        Gateway::new(&self.base_url, timeout).expect("gateway")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// The front end, served against `upstream`, on an ephemeral port.
pub struct TestApp {
    pub base_url: String,
    pub upstream: Upstream,
    pub client: reqwest::Client,
}

const COOKIE_SECRET: &str = "integration-test-secret";

fn front_end(gateway: Gateway) -> Router {
    let cookies = CookieSettings::new(Some(COOKIE_SECRET), "standup_session", 1, false);
    router(AppState::new(gateway, cookies))
}

async fn serve(app: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}", addr))
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let upstream = Upstream::spawn().await?;
        let base_url = serve(front_end(upstream.gateway(Duration::from_secs(2)))).await?;

        Ok(Self {
            base_url,
            upstream,
            client: browser()?,
        })
    }

    /// A second front end with the same cookie secret whose API is
    /// unreachable. Cookies are not port scoped, so `client` stays logged in
    /// against it.
    pub async fn unreachable_twin(&self) -> Result<String> {
        let port = portpicker::pick_unused_port().context("no free port")?;
        let gateway = Gateway::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2))?;
        serve(front_end(gateway)).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).form(form).send().await?)
    }

    /// Log in and return the redirect target.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .post_form("/login", &[("username", username), ("password", password)])
            .await?;
        Ok(location(&res).unwrap_or_default())
    }

    /// GET `path` and return the body, failing on anything but 200.
    pub async fn page(&self, path: &str) -> Result<String> {
        let res = self.get(path).await?;
        anyhow::ensure!(res.status() == reqwest::StatusCode::OK, "GET {} answered {}", path, res.status());
        Ok(res.text().await?)
    }
}

/// A client that keeps cookies and does not follow redirects.
pub fn browser() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("failed to build test client")
}

pub fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record(State(calls): State<Calls>, request: Request, next: Next) -> Response {
    let call = Call {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    calls.lock().unwrap().push(call);
    next.run(request).await
}

fn mock_routes() -> Router {
    Router::new()
        .route("/token", post(token))
        .route("/token/refresh", post(refresh))
        .route("/users/me/", get(me))
        .route("/users/", get(users).post(create_user))
        .route("/standups/", get(standups).post(create_standup))
        .route("/standups/:id", get(standup).put(update_standup))
        .route("/sessions/", post(create_session))
        .route("/sessions/:id", get(session))
        .route("/sessions/standup/:id", get(standup_sessions))
        .route("/responses/", post(create_response))
        .route("/responses/session/:id", get(session_responses))
        .route("/always401", get(always_unauthorized))
        .route("/slow", get(slow))
        .route("/server-error", get(server_error))
        .route("/raw", get(raw))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Tokens accepted everywhere. F1 is only good for the identity lookup.
/// E1 sees a failing database behind `/standups/`, M1 sees garbage bodies.
fn authorized(headers: &HeaderMap) -> bool {
    matches!(bearer(headers).as_deref(), Some("A1" | "A2" | "A3" | "D1" | "C1" | "E1" | "M1"))
}

fn token_is(headers: &HeaderMap, token: &str) -> bool {
    bearer(headers).as_deref() == Some(token)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Could not validate credentials"}))).into_response()
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    let user = form.get("username").map(String::as_str);
    let pass = form.get("password").map(String::as_str);

    match (user, pass) {
        (Some("alice"), Some("secret")) => Json(json!({"access_token": "A1", "refresh_token": "R1"})).into_response(),
        (Some("dev"), Some("secret")) => Json(json!({"access_token": "D1", "refresh_token": "R1"})).into_response(),
        (Some("carol"), Some("secret")) => Json(json!({"access_token": "C1", "refresh_token": "R1"})).into_response(),
        (Some("stale"), Some("secret")) => Json(json!({"access_token": "STALE", "refresh_token": "R1"})).into_response(),
        (Some("fragile"), Some("secret")) => Json(json!({"access_token": "F1"})).into_response(),
        (Some("erin"), Some("secret")) => Json(json!({"access_token": "E1", "refresh_token": "R1"})).into_response(),
        (Some("mallory"), Some("secret")) => Json(json!({"access_token": "M1", "refresh_token": "R1"})).into_response(),
        (Some("ghost"), Some("secret")) => Json(json!({"access_token": "GHOST"})).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Incorrect username or password"}))).into_response(),
    }
}

async fn refresh(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    if headers.contains_key("authorization") {
        return (StatusCode::BAD_REQUEST, "refresh must be unauthenticated").into_response();
    }
    match form.get("refresh_token").map(String::as_str) {
        Some("R1") => Json(json!({"access_token": "A2"})).into_response(),
        Some("ROTATE") => Json(json!({"access_token": "A3", "refresh_token": "R2"})).into_response(),
        Some("BROKEN") => (StatusCode::OK, "not a token").into_response(),
        _ => unauthorized(),
    }
}

async fn me(headers: HeaderMap) -> Response {
    match bearer(&headers).as_deref() {
        Some("A1" | "A2" | "A3") => Json(json!({"id": 1, "username": "alice", "role": "admin"})).into_response(),
        Some("D1") => Json(json!({"id": 2, "username": "dev", "role": "developer"})).into_response(),
        Some("C1") => Json(json!({"id": 4, "username": "carol", "role": "developer"})).into_response(),
        Some("E1") => Json(json!({"id": 5, "username": "erin", "role": "admin"})).into_response(),
        Some("M1") => Json(json!({"id": 6, "username": "mallory", "role": "admin"})).into_response(),
        Some("F1") => Json(json!({"id": 3, "username": "fragile", "role": "developer"})).into_response(),
        _ => unauthorized(),
    }
}

fn alice() -> Value {
    json!({"id": 1, "username": "alice", "email": "alice@example.com", "role": "admin"})
}

fn dev() -> Value {
    json!({"id": 2, "username": "dev", "email": "dev@example.com", "role": "developer"})
}

fn standup_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Platform",
        "days_of_week": "Monday,Wednesday",
        "time_of_day": "09:30:00",
        "timezone": "Europe/London",
        "duration_minutes": 15,
        "facilitator_id": 2,
        "facilitator": dev(),
        "members": [alice(), dev()],
    })
}

async fn users(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([alice(), dev()])).into_response()
}

async fn create_user(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "Username already registered"}))).into_response();
    }
    Json(json!({"id": 9, "username": body["username"], "role": body["role"]})).into_response()
}

async fn standups(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if token_is(&headers, "E1") {
        return server_error().await;
    }
    if token_is(&headers, "M1") {
        return Json(json!({"standups": "not a list"})).into_response();
    }
    Json(json!([standup_json(1)])).into_response()
}

async fn create_standup(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if token_is(&headers, "E1") {
        return server_error().await;
    }
    if body["name"] == "" {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": "Name is required"}))).into_response();
    }
    Json(json!({"id": 2, "name": body["name"]})).into_response()
}

async fn standup(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Standup not found"}))).into_response();
    }
    Json(standup_json(id)).into_response()
}

async fn update_standup(headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"id": id, "name": body["name"]})).into_response()
}

async fn create_session(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"id": 5, "standup_id": body["standup_id"], "date": body["date"]})).into_response()
}

async fn session(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 5 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Session not found"}))).into_response();
    }
    if token_is(&headers, "M1") {
        return (StatusCode::OK, "<html>upstream maintenance page</html>").into_response();
    }
    Json(json!({"id": 5, "standup_id": 1, "date": "2024-03-04T09:30:00", "standup": standup_json(1)})).into_response()
}

async fn standup_sessions(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([{"id": 5, "standup_id": 1, "date": "2024-03-04T09:30:00"}])).into_response()
}

async fn create_response(headers: HeaderMap, Json(_body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"id": 11})).into_response()
}

/// Alice (id 1) has already answered session 5.
async fn session_responses(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([{
        "id": 10,
        "user_id": 1,
        "yesterday": "Reviewed the migration",
        "today": "Ship it",
        "blockers": null,
        "user": alice(),
    }]))
    .into_response()
}

async fn always_unauthorized() -> Response {
    unauthorized()
}

async fn slow() -> Response {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({"ok": true})).into_response()
}

async fn server_error() -> Response {
    (StatusCode::BAD_GATEWAY, Json(json!({"detail": "database unavailable"}))).into_response()
}

async fn raw() -> Response {
    (StatusCode::OK, "plain body").into_response()
}
