use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::AppError;

/// Body of an upstream response: parsed JSON when possible, raw bytes otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(Bytes),
}

impl ResponseBody {
    fn from_bytes(bytes: Bytes) -> Self {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(bytes),
        }
    }
}

/// Normalized outcome of one upstream call.
///
/// `synthetic` marks results fabricated by the gateway after a transport
/// failure; no HTTP exchange produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    status: u16,
    body: ResponseBody,
    synthetic: bool,
}

/// Coarse classification handlers branch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unauthorized,
    /// 4xx other than 401, with the upstream `detail` when it sent one.
    Rejected(Option<String>),
    ServerError,
}

impl ApiResult {
    pub fn from_upstream(status: u16, bytes: Bytes) -> Self {
        Self {
            status,
            body: ResponseBody::from_bytes(bytes),
            synthetic: false,
        }
    }

    pub fn synthetic(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Json(json!({ "detail": detail.into() })),
            synthetic: true,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn outcome(&self) -> Outcome {
        match self.status {
            200..=299 => Outcome::Success,
            401 => Outcome::Unauthorized,
            400..=499 => Outcome::Rejected(self.detail()),
            _ => Outcome::ServerError,
        }
    }

    /// Deserialize the body. Raw bodies and schema mismatches are local faults.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        match &self.body {
            ResponseBody::Json(value) => Ok(T::deserialize(value)?),
            ResponseBody::Raw(bytes) => Err(AppError::malformed(format!(
                "expected JSON body from upstream ({} bytes of non-JSON)",
                bytes.len()
            ))),
        }
    }

    /// The upstream `detail` field. Validation errors arrive as structured
    /// values and are rendered compactly.
    pub fn detail(&self) -> Option<String> {
        let ResponseBody::Json(value) = &self.body else {
            return None;
        };
        match value.get("detail")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Body as text, for logs.
    pub fn text(&self) -> String {
        match &self.body {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, unreachable host.
    Unavailable,
    Timeout,
    Other,
}

/// A call that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Unavailable
        } else {
            TransportErrorKind::Other
        };
        TransportError::new(kind, err.to_string())
    }
}

impl From<TransportError> for ApiResult {
    fn from(err: TransportError) -> Self {
        match err.kind {
            TransportErrorKind::Unavailable => ApiResult::synthetic(
                503,
                "Service unavailable. Could not connect to the API.",
            ),
            TransportErrorKind::Timeout => ApiResult::synthetic(
                504,
                "Request timed out. The API is taking too long to respond.",
            ),
            TransportErrorKind::Other => {
                ApiResult::synthetic(500, format!("An error occurred: {}", err.message))
            }
        }
    }
}
