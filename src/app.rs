// app.rs - Router assembly
//
// Three tiers: public routes, protected routes behind require_login, and
// admin routes behind require_admin. Guards are route layers so unmatched
// paths still 404 instead of bouncing to /login.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{protected, public};
use crate::middleware::{require_admin, require_login};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::index))
        .route("/health", get(public::health))
        .route("/login", get(public::login_page).post(public::login))
        .route("/register", get(public::register_page).post(public::register))
        .route("/logout", get(public::logout))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(protected::dashboard))
        .route("/standups/:id", get(protected::view_standup))
        .route(
            "/sessions/:id",
            get(protected::view_session).post(protected::submit_response),
        )
        .route("/create_session/:standup_id", post(protected::create_session))
        .route_layer(from_fn_with_state(state, require_login))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/standups/new",
            get(protected::new_standup_page).post(protected::create_standup),
        )
        .route(
            "/standups/:id/edit",
            get(protected::edit_standup_page).post(protected::edit_standup),
        )
        .route_layer(from_fn_with_state(state, require_admin))
}
