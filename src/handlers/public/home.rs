use axum::response::{IntoResponse, Json, Redirect, Response};
use serde_json::{json, Value};

use crate::handlers::render;
use crate::session::Session;
use crate::views;

/// GET / - landing page, or straight to the dashboard when logged in
pub async fn index(mut session: Session) -> Response {
    if session.credential().is_some() {
        return (session, Redirect::to("/dashboard")).into_response();
    }
    let page = render(&mut session, |_, flashes| views::index_page(flashes));
    (session, page).into_response()
}

/// GET /health - liveness only; the upstream API is not consulted
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now(),
        }
    }))
}
