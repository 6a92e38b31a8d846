use std::time::Duration;

use crate::api::models::TokenGrant;
use crate::api::request::{ApiRequest, RequestBody};
use crate::api::result::{ApiResult, TransportError};
use crate::error::AppError;
use crate::session::Credential;

pub const REFRESH_PATH: &str = "/token/refresh";

/// Authorized access to the upstream API.
///
/// Every call is total: transport failures come back as synthetic
/// [`ApiResult`]s, never as errors. A 401 on a credential that carries a
/// refresh token triggers exactly one refresh and one replay.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http_client(http, base_url, timeout))
    }

    /// Use a prebuilt client (connection pool reuse or testing).
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// One HTTP exchange. The only place transport errors exist as errors.
    async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<ApiResult, TransportError> {
        let mut builder = self
            .http
            .request(request.method.into(), self.url(&request.path))
            .timeout(self.timeout);

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        Ok(ApiResult::from_upstream(status, bytes))
    }

    /// Single call with no refresh handling.
    pub async fn execute(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult {
        match self.send(request, token).await {
            Ok(result) => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    status = result.status(),
                    "upstream call"
                );
                result
            }
            Err(err) => {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    kind = ?err.kind,
                    error = %err.message,
                    "upstream transport failure"
                );
                err.into()
            }
        }
    }

    /// Perform `request` on behalf of `credential`, refreshing once on 401.
    ///
    /// With no credential the call is unauthenticated (login, registration).
    pub async fn call(&self, request: &ApiRequest, credential: Option<&mut Credential>) -> ApiResult {
        let Some(credential) = credential else {
            return self.execute(request, None).await;
        };

        let result = self.execute(request, Some(&credential.access_token)).await;

        if !result.is_unauthorized() || result.is_synthetic() || credential.refresh_token.is_none() {
            return result;
        }

        if !self.refresh(credential).await {
            return result;
        }

        tracing::debug!(path = %request.path, "replaying request with refreshed token");
        self.execute(request, Some(&credential.access_token)).await
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Returns `false` and leaves `credential` untouched on any failure,
    /// whether the refresh was rejected or never reached the API.
    pub async fn refresh(&self, credential: &mut Credential) -> bool {
        let Some(refresh_token) = credential.refresh_token.clone() else {
            return false;
        };

        let request = ApiRequest::post(REFRESH_PATH).form([("refresh_token", refresh_token)]);

        let result = match self.send(&request, None).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(kind = ?err.kind, error = %err.message, "token refresh unreachable");
                return false;
            }
        };

        if !result.is_success() {
            tracing::warn!(status = result.status(), "token refresh rejected");
            return false;
        }

        match result.json::<TokenGrant>() {
            Ok(grant) => {
                credential.apply_grant(grant);
                tracing::debug!("access token refreshed");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh returned an unusable body");
                false
            }
        }
    }
}
