// handlers/public/auth.rs - login, registration, logout

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::auth::{self, RegistrationError, RegistrationForm};
use crate::handlers::{finish, flash_failure, render, Halt};
use crate::session::Session;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /login
pub async fn login_page(mut session: Session) -> Response {
    let page = render(&mut session, |_, flashes| views::login_page(flashes, ""));
    (session, page).into_response()
}

/// POST /login - token grant, then identity lookup
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth::login(&state.gateway, &form.username, &form.password).await {
        Ok(credential) => {
            let name = credential.username.clone().unwrap_or_else(|| form.username.clone());
            tracing::info!(user_id = ?credential.user_id, role = ?credential.role, "login succeeded");

            session.set_credential(credential);
            session.flash_success(format!("Welcome back, {}!", name));
            (session, Redirect::to("/dashboard")).into_response()
        }
        Err(err) => {
            tracing::info!(error = %err, "login failed");
            session.flash_error(err.user_message());
            let page = render(&mut session, |_, flashes| views::login_page(flashes, &form.username));
            (session, page).into_response()
        }
    }
}

/// GET /register
pub async fn register_page(mut session: Session) -> Response {
    let page = render(&mut session, |_, flashes| views::register_page(flashes));
    (session, page).into_response()
}

/// POST /register - passwords are compared before anything is sent upstream
pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let outcome = submit_registration(&state, &mut session, form).await;
    finish(session, "register", outcome, "/register")
}

async fn submit_registration(
    state: &AppState,
    session: &mut Session,
    form: RegistrationForm,
) -> Result<Response, Halt> {
    let result = match auth::register(&state.gateway, form).await {
        Ok(result) => result,
        Err(RegistrationError::PasswordMismatch) => {
            session.flash_error(RegistrationError::PasswordMismatch.to_string());
            return Ok(render(session, |_, flashes| views::register_page(flashes)));
        }
        Err(RegistrationError::Local(err)) => return Err(err.into()),
    };

    if result.is_success() {
        session.flash_success("Registration successful! Please log in.");
        return Ok(Redirect::to("/login").into_response());
    }

    flash_failure(session, "Registration failed", &result);
    Ok(render(session, |_, flashes| views::register_page(flashes)))
}

/// GET /logout - purely local, the upstream API is not told
pub async fn logout(mut session: Session) -> Response {
    session.clear();
    session.flash_success("You have been logged out");
    (session, Redirect::to("/")).into_response()
}
