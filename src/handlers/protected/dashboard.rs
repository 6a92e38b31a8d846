use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::api::models::Standup;
use crate::api::{ApiRequest, Outcome};
use crate::handlers::{expire, render, Halt};
use crate::session::Session;
use crate::state::AppState;
use crate::views;

pub const STANDUPS_PATH: &str = "/standups/";

/// GET /dashboard - the visitor's standups
pub async fn dashboard(State(state): State<AppState>, mut session: Session) -> Response {
    match load_dashboard(&state, &mut session).await {
        Ok(response) | Err(Halt::Respond(response)) => (session, response).into_response(),
        Err(Halt::Fault(err)) => {
            // Falling back to /dashboard would loop; render an empty list instead
            tracing::error!(error = %err, "exception in dashboard route");
            session.flash_error("An error occurred while loading standups. Please try again later.");
            let page = render(&mut session, |user, flashes| views::dashboard_page(user, flashes, &[]));
            (session, page).into_response()
        }
    }
}

async fn load_dashboard(state: &AppState, session: &mut Session) -> Result<Response, Halt> {
    let result = state
        .gateway
        .call(&ApiRequest::get(STANDUPS_PATH), session.credential_mut())
        .await;

    match result.outcome() {
        Outcome::Success => {
            let standups: Vec<Standup> = result.json()?;
            Ok(render(session, |user, flashes| views::dashboard_page(user, flashes, &standups)))
        }
        Outcome::Unauthorized => Err(expire(session)),
        _ => {
            tracing::info!(status = result.status(), body = %result.text(), "failed to load standups");
            session.flash_error("Failed to load standups. Please try again later.");
            Ok(render(session, |user, flashes| views::dashboard_page(user, flashes, &[])))
        }
    }
}
