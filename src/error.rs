// Local error types
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Faults raised inside this process.
///
/// Upstream HTTP failures are never represented here: the gateway folds those
/// into an [`ApiResult`](crate::api::ApiResult) and handlers branch on status.
/// What remains are configuration problems and the unexpected local faults the
/// route boundary catches as a last resort.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("invalid form data: {0}")]
    InvalidForm(String),

    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AppError::MalformedResponse(message.into())
    }

    pub fn invalid_form(message: impl Into<String>) -> Self {
        AppError::InvalidForm(message.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

// Never show internals to the visitor
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "unhandled application error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(crate::views::error_page("Something went wrong. Please try again later.")),
        )
            .into_response()
    }
}
