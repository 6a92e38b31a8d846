// handlers/protected/session.rs - standup sessions and status responses

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::api::models::{NewSession, NewStatusResponse, Standup, StandupSession, StatusResponse};
use crate::api::{ApiRequest, Outcome};
use crate::handlers::{expire, fetch, finish, flash_failure, render, Halt};
use crate::session::Session;
use crate::state::AppState;
use crate::views;

const SESSIONS_PATH: &str = "/sessions/";
const RESPONSES_PATH: &str = "/responses/";

#[derive(Debug, Default, Deserialize)]
pub struct ResponseForm {
    #[serde(default)]
    pub yesterday: String,
    #[serde(default)]
    pub today: String,
    #[serde(default)]
    pub blockers: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewSessionForm {
    #[serde(default)]
    pub session_date: String,
}

/// A session page's data: the session itself and the responses so far.
struct Loaded {
    session: StandupSession,
    responses: Vec<StatusResponse>,
}

impl Loaded {
    fn answered_by(&self, user_id: Option<i64>) -> bool {
        user_id.is_some_and(|id| self.responses.iter().any(|r| r.user_id == id))
    }
}

async fn load_session(state: &AppState, session: &mut Session, id: i64) -> Result<Loaded, Halt> {
    let standup_session: StandupSession =
        match fetch(state, session, &ApiRequest::get(format!("/sessions/{}", id))).await? {
            Some(found) => found,
            None => {
                session.flash_error("Failed to load session");
                return Err(Halt::redirect("/dashboard"));
            }
        };

    let responses = fetch(state, session, &ApiRequest::get(format!("/responses/session/{}", id)))
        .await?
        .unwrap_or_default();

    Ok(Loaded {
        session: standup_session,
        responses,
    })
}

fn show(session: &mut Session, loaded: &Loaded) -> Response {
    let responded = loaded.answered_by(session.credential().and_then(|c| c.user_id));
    render(session, |user, flashes| {
        views::session_page(user, flashes, &loaded.session, &loaded.responses, responded)
    })
}

/// GET /sessions/:id
pub async fn view_session(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i64>,
) -> Response {
    let outcome = match load_session(&state, &mut session, id).await {
        Ok(loaded) => Ok(show(&mut session, &loaded)),
        Err(halt) => Err(halt),
    };
    finish(session, "view_session", outcome, "/dashboard")
}

/// POST /sessions/:id - one response per visitor per session
pub async fn submit_response(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i64>,
    Form(form): Form<ResponseForm>,
) -> Response {
    let outcome = post_response(&state, &mut session, id, form).await;
    finish(session, "submit_response", outcome, "/dashboard")
}

async fn post_response(
    state: &AppState,
    session: &mut Session,
    id: i64,
    form: ResponseForm,
) -> Result<Response, Halt> {
    let loaded = load_session(state, session, id).await?;
    if loaded.answered_by(session.credential().and_then(|c| c.user_id)) {
        tracing::debug!(session_id = id, "response already submitted; ignoring");
        return Ok(show(session, &loaded));
    }

    let body = NewStatusResponse {
        session_id: id,
        yesterday: form.yesterday,
        today: form.today,
        blockers: form.blockers,
    };
    let request = ApiRequest::post(RESPONSES_PATH).json(&body)?;
    let result = state.gateway.call(&request, session.credential_mut()).await;

    match result.outcome() {
        Outcome::Success => {
            session.flash_success("Response submitted successfully");
            Ok(Redirect::to(&format!("/sessions/{}", id)).into_response())
        }
        Outcome::Unauthorized => Err(expire(session)),
        _ => {
            tracing::info!(status = result.status(), body = %result.text(), "response rejected");
            session.flash_error("Failed to submit response");
            Ok(show(session, &loaded))
        }
    }
}

/// POST /create_session/:standup_id - facilitator or admin only
pub async fn create_session(
    State(state): State<AppState>,
    mut session: Session,
    Path(standup_id): Path<i64>,
    Form(form): Form<NewSessionForm>,
) -> Response {
    let outcome = open_session(&state, &mut session, standup_id, form).await;
    finish(session, "create_session", outcome, "/dashboard")
}

async fn open_session(
    state: &AppState,
    session: &mut Session,
    standup_id: i64,
    form: NewSessionForm,
) -> Result<Response, Halt> {
    let standup_path = format!("/standups/{}", standup_id);
    let standup: Standup = match fetch(state, session, &ApiRequest::get(standup_path.as_str())).await? {
        Some(standup) => standup,
        None => {
            session.flash_error("Standup not found");
            return Err(Halt::redirect("/dashboard"));
        }
    };

    let allowed = session.credential().is_some_and(|c| {
        c.is_admin() || (c.user_id.is_some() && c.user_id == standup.facilitator_id)
    });
    if !allowed {
        session.flash_error("Only the facilitator or admin can create sessions");
        return Err(Halt::redirect(&standup_path));
    }

    let body = NewSession {
        standup_id,
        date: form.session_date,
    };
    let request = ApiRequest::post(SESSIONS_PATH).json(&body)?;
    let result = state.gateway.call(&request, session.credential_mut()).await;

    match result.outcome() {
        Outcome::Success => session.flash_success("Session created successfully"),
        Outcome::Unauthorized => return Err(expire(session)),
        _ => flash_failure(session, "Failed to create session", &result),
    }
    Ok(Redirect::to(&standup_path).into_response())
}
