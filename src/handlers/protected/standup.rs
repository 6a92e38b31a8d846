// handlers/protected/standup.rs - view, create and edit standups

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::api::models::{Standup, StandupPayload, StandupSession, User};
use crate::api::{ApiRequest, Outcome};
use crate::auth::USERS_PATH;
use crate::error::AppError;
use crate::handlers::protected::dashboard::STANDUPS_PATH;
use crate::handlers::{expire, fetch, finish, flash_failure, render, Halt};
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, StandupFormValues};

/// Submitted create/edit form. `days` and `member_ids` repeat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub time_of_day: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub facilitator_id: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

fn parse_int(field: &str, value: &str) -> Result<i64, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| AppError::invalid_form(format!("{} must be a whole number", field)))
}

impl StandupForm {
    pub fn to_payload(&self) -> Result<StandupPayload, AppError> {
        let member_ids = self
            .member_ids
            .iter()
            .map(|id| parse_int("member_ids", id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StandupPayload {
            name: self.name.clone(),
            days_of_week: self.days.join(","),
            time_of_day: self.time_of_day.clone(),
            timezone: self.timezone.clone(),
            duration_minutes: parse_int("duration", &self.duration)?,
            facilitator_id: parse_int("facilitator_id", &self.facilitator_id)?,
            member_ids,
        })
    }

    /// Echo the submission back into the form after a failure.
    pub fn values(&self) -> StandupFormValues {
        StandupFormValues {
            name: self.name.clone(),
            days: self.days.clone(),
            time_of_day: self.time_of_day.clone(),
            timezone: self.timezone.clone(),
            duration_minutes: self.duration.clone(),
            facilitator_id: self.facilitator_id.trim().parse().ok(),
            member_ids: self.member_ids.iter().filter_map(|id| id.trim().parse().ok()).collect(),
        }
    }
}

fn standup_path(id: i64) -> String {
    format!("/standups/{}", id)
}

async fn load_users(state: &AppState, session: &mut Session) -> Result<Vec<User>, Halt> {
    Ok(fetch(state, session, &ApiRequest::get(USERS_PATH)).await?.unwrap_or_default())
}

async fn load_standup(state: &AppState, session: &mut Session, id: i64) -> Result<Standup, Halt> {
    match fetch::<Standup>(state, session, &ApiRequest::get(standup_path(id))).await? {
        Some(standup) => Ok(standup),
        None => {
            session.flash_error("Standup not found");
            Err(Halt::redirect("/dashboard"))
        }
    }
}

async fn render_form(
    state: &AppState,
    session: &mut Session,
    action: &str,
    heading: &str,
    values: &StandupFormValues,
) -> Result<Response, Halt> {
    let users = load_users(state, session).await?;
    Ok(render(session, |user, flashes| {
        views::standup_form_page(user, flashes, action, heading, values, &users)
    }))
}

/// GET /standups/:id
pub async fn view_standup(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i64>,
) -> Response {
    let outcome = show_standup(&state, &mut session, id).await;
    finish(session, "view_standup", outcome, "/dashboard")
}

async fn show_standup(state: &AppState, session: &mut Session, id: i64) -> Result<Response, Halt> {
    let standup = load_standup(state, session, id).await?;
    let sessions: Vec<StandupSession> = fetch(
        state,
        session,
        &ApiRequest::get(format!("/sessions/standup/{}", id)),
    )
    .await?
    .unwrap_or_default();

    Ok(render(session, |user, flashes| {
        views::standup_page(user, flashes, &standup, &sessions)
    }))
}

/// GET /standups/new (admin)
pub async fn new_standup_page(State(state): State<AppState>, mut session: Session) -> Response {
    let values = StandupFormValues {
        timezone: "UTC".to_string(),
        ..Default::default()
    };
    let outcome = render_form(&state, &mut session, "/standups/new", "New standup", &values).await;
    finish(session, "new_standup", outcome, "/dashboard")
}

/// POST /standups/new (admin)
pub async fn create_standup(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<StandupForm>,
) -> Response {
    let outcome = submit_new_standup(&state, &mut session, form).await;
    finish(session, "create_standup", outcome, "/dashboard")
}

async fn submit_new_standup(
    state: &AppState,
    session: &mut Session,
    form: StandupForm,
) -> Result<Response, Halt> {
    let payload = match form.to_payload() {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!(error = %err, "rejected standup form");
            session.flash_error("Invalid form data");
            return render_form(state, session, "/standups/new", "New standup", &form.values()).await;
        }
    };

    let request = ApiRequest::post(STANDUPS_PATH).json(&payload)?;
    let result = state.gateway.call(&request, session.credential_mut()).await;

    match result.outcome() {
        Outcome::Success => {
            session.flash_success("Standup created successfully");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Outcome::Unauthorized => Err(expire(session)),
        _ => {
            flash_failure(session, "Failed to create standup", &result);
            render_form(state, session, "/standups/new", "New standup", &form.values()).await
        }
    }
}

/// GET /standups/:id/edit (admin)
pub async fn edit_standup_page(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i64>,
) -> Response {
    let outcome = show_edit_form(&state, &mut session, id).await;
    finish(session, "edit_standup", outcome, "/dashboard")
}

async fn show_edit_form(state: &AppState, session: &mut Session, id: i64) -> Result<Response, Halt> {
    let standup = load_standup(state, session, id).await?;
    let action = format!("/standups/{}/edit", id);
    render_form(state, session, &action, "Edit standup", &StandupFormValues::from(&standup)).await
}

/// POST /standups/:id/edit (admin)
pub async fn edit_standup(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i64>,
    Form(form): Form<StandupForm>,
) -> Response {
    let outcome = submit_edit(&state, &mut session, id, form).await;
    finish(session, "edit_standup", outcome, "/dashboard")
}

async fn submit_edit(
    state: &AppState,
    session: &mut Session,
    id: i64,
    form: StandupForm,
) -> Result<Response, Halt> {
    // The standup must still exist before it is overwritten
    load_standup(state, session, id).await?;
    let action = format!("/standups/{}/edit", id);

    let payload = match form.to_payload() {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!(error = %err, "rejected standup form");
            session.flash_error("Invalid form data");
            return render_form(state, session, &action, "Edit standup", &form.values()).await;
        }
    };

    let request = ApiRequest::put(standup_path(id)).json(&payload)?;
    let result = state.gateway.call(&request, session.credential_mut()).await;

    match result.outcome() {
        Outcome::Success => {
            session.flash_success("Standup updated successfully");
            Ok(Redirect::to(&standup_path(id)).into_response())
        }
        Outcome::Unauthorized => Err(expire(session)),
        _ => {
            flash_failure(session, "Failed to update standup", &result);
            render_form(state, session, &action, "Edit standup", &form.values()).await
        }
    }
}
