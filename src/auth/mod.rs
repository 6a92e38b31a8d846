use serde::Deserialize;

use crate::api::models::{Identity, NewUser, TokenGrant};
use crate::api::{ApiRequest, ApiResult, Gateway};
use crate::error::AppError;
use crate::session::{Credential, Role};

pub const TOKEN_PATH: &str = "/token";
pub const IDENTITY_PATH: &str = "/users/me/";
pub const USERS_PATH: &str = "/users/";

/// Shown for every login failure, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("token endpoint answered {0}")]
    Rejected(u16),

    #[error("token grant unusable: {0}")]
    MalformedGrant(AppError),

    #[error("identity lookup answered {0}")]
    IdentityUnavailable(u16),

    #[error("identity unusable: {0}")]
    MalformedIdentity(AppError),
}

impl LoginError {
    /// The distinct causes are for logs only.
    pub fn user_message(&self) -> &'static str {
        INVALID_CREDENTIALS
    }
}

/// Obtain a token pair, then cache the caller's identity on it.
///
/// The identity lookup goes through [`Gateway::call`], so a token that is
/// already stale is refreshed once here as well.
pub async fn login(gateway: &Gateway, username: &str, password: &str) -> Result<Credential, LoginError> {
    let request = ApiRequest::post(TOKEN_PATH).form([("username", username), ("password", password)]);
    let result = gateway.execute(&request, None).await;

    if !result.is_success() {
        return Err(LoginError::Rejected(result.status()));
    }

    let grant: TokenGrant = result.json().map_err(LoginError::MalformedGrant)?;
    let mut credential = Credential::from_grant(grant);

    let identity = gateway
        .call(&ApiRequest::get(IDENTITY_PATH), Some(&mut credential))
        .await;

    if !identity.is_success() {
        return Err(LoginError::IdentityUnavailable(identity.status()));
    }

    let identity: Identity = identity.json().map_err(LoginError::MalformedIdentity)?;
    credential.set_identity(identity);

    Ok(credential)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error(transparent)]
    Local(#[from] AppError),
}

impl RegistrationForm {
    /// Build the upstream request. New accounts always start as developers.
    pub fn into_request(self) -> Result<ApiRequest, RegistrationError> {
        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }

        let user = NewUser {
            email: self.email,
            username: self.username,
            password: self.password,
            role: Role::Developer,
        };

        Ok(ApiRequest::post(USERS_PATH).json(&user)?)
    }
}

/// Create an account. A password mismatch never reaches the API.
pub async fn register(gateway: &Gateway, form: RegistrationForm) -> Result<ApiResult, RegistrationError> {
    let request = form.into_request()?;
    Ok(gateway.call(&request, None).await)
}
