// handlers/mod.rs - Route handlers in two tiers
//
// Public (no credential) and protected (credential required, some routes
// admin-only). Guards live in crate::middleware and are layered per tier in
// crate::app; handlers never check access themselves.
//
// Every handler follows the same shape: an inner fn does the work against
// `&mut Session` and returns `Result<Response, Halt>`, and the outer fn
// writes the session back and catches local faults as a last resort.

pub mod protected;
pub mod public;

use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::de::DeserializeOwned;

use crate::api::{ApiRequest, ApiResult, Outcome};
use crate::error::AppError;
use crate::session::{Credential, Flash, Session};
use crate::state::AppState;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const GENERIC_FAILURE: &str = "An error occurred. Please try again later.";

/// Early exit from an inner handler.
pub(crate) enum Halt {
    /// Stop here and send this response (redirects, forced logout).
    Respond(Response),
    /// Unexpected local fault for the route boundary to catch.
    Fault(AppError),
}

impl From<AppError> for Halt {
    fn from(err: AppError) -> Self {
        Halt::Fault(err)
    }
}

impl Halt {
    pub(crate) fn redirect(to: &str) -> Self {
        Halt::Respond(Redirect::to(to).into_response())
    }
}

/// Write the session back and turn a fault into a flash plus redirect.
pub(crate) fn finish(
    mut session: Session,
    route: &'static str,
    outcome: Result<Response, Halt>,
    fallback: &str,
) -> Response {
    match outcome {
        Ok(response) | Err(Halt::Respond(response)) => (session, response).into_response(),
        Err(Halt::Fault(err)) => {
            tracing::error!(route, error = %err, "unexpected failure in route");
            session.flash_error(GENERIC_FAILURE);
            (session, Redirect::to(fallback)).into_response()
        }
    }
}

/// Render a page, draining pending flashes into it.
pub(crate) fn render<F>(session: &mut Session, page: F) -> Response
where
    F: FnOnce(Option<&Credential>, &[Flash]) -> String,
{
    let flashes = session.take_flashes();
    Html(page(session.credential(), &flashes)).into_response()
}

/// Unrecoverable 401: drop the credential and send the visitor to login.
pub(crate) fn expire(session: &mut Session) -> Halt {
    tracing::info!("credential rejected after refresh attempt; forcing logout");
    session.clear();
    session.flash_error(SESSION_EXPIRED);
    Halt::redirect("/login")
}

/// Flash a failed upstream write. 5xx (including synthetic transport
/// failures) get a generic message and a log line; other statuses show the
/// upstream `detail`.
pub(crate) fn flash_failure(session: &mut Session, action: &str, result: &ApiResult) {
    match result.outcome() {
        Outcome::ServerError => {
            tracing::error!(
                status = result.status(),
                synthetic = result.is_synthetic(),
                body = %result.text(),
                "{action}"
            );
            session.flash_error(format!("{action}. Please try again later."));
        }
        _ => {
            let detail = result.detail().unwrap_or_else(|| "Unknown error".to_string());
            session.flash_error(format!("{action}: {detail}"));
        }
    }
}

/// GET and decode. `Ok(None)` on any non-success other than 401, which
/// expires the session.
pub(crate) async fn fetch<T: DeserializeOwned>(
    state: &AppState,
    session: &mut Session,
    request: &ApiRequest,
) -> Result<Option<T>, Halt> {
    let result = state.gateway.call(request, session.credential_mut()).await;

    match result.outcome() {
        Outcome::Success => Ok(Some(result.json()?)),
        Outcome::Unauthorized => Err(expire(session)),
        Outcome::ServerError => {
            tracing::error!(
                path = %request.path,
                status = result.status(),
                body = %result.text(),
                "upstream server error"
            );
            Ok(None)
        }
        Outcome::Rejected(_) => {
            tracing::info!(path = %request.path, status = result.status(), body = %result.text(), "upstream rejected request");
            Ok(None)
        }
    }
}
