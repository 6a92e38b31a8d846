// Wire types for the upstream Standup API.
//
// Only the fields this front end reads are modelled; anything else the API
// sends is ignored.

use serde::{Deserialize, Serialize};

use crate::session::Role;

/// Body of `/token` and `/token/refresh` on success.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of `GET /users/me/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub days_of_week: String,
    #[serde(default)]
    pub time_of_day: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default)]
    pub facilitator_id: Option<i64>,
    #[serde(default)]
    pub facilitator: Option<User>,
    #[serde(default)]
    pub members: Vec<User>,
}

impl Standup {
    pub fn days(&self) -> Vec<&str> {
        self.days_of_week
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .collect()
    }

    pub fn member_ids(&self) -> Vec<i64> {
        self.members.iter().map(|m| m.id).collect()
    }
}

/// One occurrence of a standup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandupSession {
    pub id: i64,
    #[serde(default)]
    pub standup_id: Option<i64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub standup: Option<Standup>,
}

impl StandupSession {
    pub fn timezone(&self) -> &str {
        self.standup.as_ref().map(|s| s.timezone.as_str()).unwrap_or("UTC")
    }
}

/// A member's status update for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub id: Option<i64>,
    pub user_id: i64,
    #[serde(default)]
    pub yesterday: String,
    #[serde(default)]
    pub today: String,
    #[serde(default)]
    pub blockers: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for `POST /standups/` and `PUT /standups/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandupPayload {
    pub name: String,
    pub days_of_week: String,
    pub time_of_day: String,
    pub timezone: String,
    pub duration_minutes: i64,
    pub facilitator_id: i64,
    pub member_ids: Vec<i64>,
}

/// Body for `POST /users/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Body for `POST /sessions/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSession {
    pub standup_id: i64,
    pub date: String,
}

/// Body for `POST /responses/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewStatusResponse {
    pub session_id: i64,
    pub yesterday: String,
    pub today: String,
    pub blockers: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}
