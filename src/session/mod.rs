//! Per-visitor Credential Store.
//!
//! The store is a signed cookie holding base64url(JSON([`SessionData`])). It is
//! signed but not encrypted: the visitor can read it, so it carries nothing
//! beyond the bearer tokens that browser already holds.
//!
//! [`Session`] is an axum extractor. Handlers mutate it and return it as a
//! response part, which writes the cookie back (last write wins).

mod credential;
mod flash;

pub use credential::{Credential, Role};
pub use flash::{Flash, FlashLevel};

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::state::AppState;

/// Flashes only drain when a page renders; a client that never renders one
/// must not grow the cookie past what browsers accept.
pub const MAX_PENDING_FLASHES: usize = 5;

/// Cookie parameters shared by every request.
#[derive(Clone)]
pub struct CookieSettings {
    pub key: Key,
    pub name: String,
    pub ttl_hours: i64,
    pub secure: bool,
}

impl CookieSettings {
    /// Derive the signing key from `secret`, or generate an ephemeral one.
    pub fn new(secret: Option<&str>, name: impl Into<String>, ttl_hours: i64, secure: bool) -> Self {
        let key = match secret {
            Some(secret) => {
                // SHA-512 gives exactly the 64 bytes Key::from requires
                let digest = Sha512::digest(secret.as_bytes());
                Key::from(digest.as_slice())
            }
            None => {
                tracing::warn!("SECRET_KEY not set; sessions will not survive a restart");
                Key::generate()
            }
        };

        Self {
            key,
            name: name.into(),
            ttl_hours,
            secure,
        }
    }

    fn session_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::hours(self.ttl_hours))
            .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), ""))
            .path("/")
            .max_age(time::Duration::ZERO)
            .build()
    }
}

impl std::fmt::Debug for CookieSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSettings")
            .field("name", &self.name)
            .field("ttl_hours", &self.ttl_hours)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.credential.is_none() && self.flashes.is_empty()
    }

    fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

pub struct Session {
    jar: SignedCookieJar,
    settings: CookieSettings,
    data: SessionData,
    loaded: bool,
}

impl Session {
    pub fn from_jar(jar: SignedCookieJar, settings: CookieSettings) -> Self {
        let stored = jar.get(&settings.name);
        let loaded = stored.is_some();
        let data = stored
            .and_then(|cookie| {
                let decoded = SessionData::decode(cookie.value());
                if decoded.is_none() {
                    tracing::debug!("discarding undecodable session cookie");
                }
                decoded
            })
            .unwrap_or_default();

        Self {
            jar,
            settings,
            data,
            loaded,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.data.credential.as_ref()
    }

    pub fn credential_mut(&mut self) -> Option<&mut Credential> {
        self.data.credential.as_mut()
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.data.credential = Some(credential);
    }

    /// Drop everything: credential and pending flashes.
    pub fn clear(&mut self) {
        self.data = SessionData::default();
    }

    /// Queue a notice. A message already pending is not queued twice, and only
    /// the newest [`MAX_PENDING_FLASHES`] are kept so the cookie stays small.
    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        let flash = Flash::new(level, message);
        let flashes = &mut self.data.flashes;
        if flashes.contains(&flash) {
            return;
        }
        flashes.push(flash);
        if flashes.len() > MAX_PENDING_FLASHES {
            let excess = flashes.len() - MAX_PENDING_FLASHES;
            flashes.drain(..excess);
        }
    }

    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.flash(FlashLevel::Success, message);
    }

    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flash(FlashLevel::Error, message);
    }

    /// Drain pending flashes for rendering.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.data.flashes)
    }

    fn into_jar(self) -> SignedCookieJar {
        let Session {
            jar,
            settings,
            data,
            loaded,
        } = self;

        if data.is_empty() {
            return if loaded {
                jar.remove(settings.removal_cookie())
            } else {
                jar
            };
        }

        match data.encode() {
            Ok(value) => jar.add(settings.session_cookie(value)),
            Err(err) => {
                tracing::error!(error = %err, "failed to encode session; clearing it");
                jar.remove(settings.removal_cookie())
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("data", &self.data)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state).await?;
        Ok(Session::from_jar(jar, state.cookies.clone()))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.into_jar().into_response_parts(res)
    }
}
