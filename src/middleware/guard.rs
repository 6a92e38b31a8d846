use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::{Credential, Role, Session};

pub const LOGIN_REQUIRED: &str = "Please log in to access this page";
pub const PERMISSION_DENIED: &str = "You don't have permission to access this page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No usable credential: send to login.
    Unauthenticated,
    /// Logged in, but the role is not on the allow-list: send to the dashboard.
    Forbidden,
}

/// Decide access for `credential`. An empty `allowed` list means any
/// logged-in visitor.
pub fn check_access(credential: Option<&Credential>, allowed: &[Role]) -> Access {
    let Some(credential) = credential.filter(|c| c.has_access_token()) else {
        return Access::Unauthenticated;
    };

    if allowed.is_empty() {
        return Access::Granted;
    }

    match &credential.role {
        None => Access::Unauthenticated,
        Some(role) if allowed.contains(role) => Access::Granted,
        Some(_) => Access::Forbidden,
    }
}

async fn guard(allowed: &[Role], mut session: Session, request: Request, next: Next) -> Response {
    match check_access(session.credential(), allowed) {
        Access::Granted => next.run(request).await,
        Access::Unauthenticated => {
            tracing::debug!(path = %request.uri().path(), "unauthenticated visitor redirected to login");
            session.flash_error(LOGIN_REQUIRED);
            (session, Redirect::to("/login")).into_response()
        }
        Access::Forbidden => {
            tracing::info!(
                path = %request.uri().path(),
                role = ?session.credential().and_then(|c| c.role.as_ref()),
                "role not permitted"
            );
            session.flash_error(PERMISSION_DENIED);
            (session, Redirect::to("/dashboard")).into_response()
        }
    }
}

/// Any logged-in visitor.
pub async fn require_login(session: Session, request: Request, next: Next) -> Response {
    guard(&[], session, request, next).await
}

/// Admins only.
pub async fn require_admin(session: Session, request: Request, next: Next) -> Response {
    guard(&[Role::Admin], session, request, next).await
}
