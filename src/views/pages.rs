use super::{convert_timezone, escape, format_date, format_time, layout, timezone_names};
use crate::api::models::{Standup, StandupSession, StatusResponse, User};
use crate::session::{Credential, Flash};

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];


pub fn index_page(flashes: &[Flash]) -> String {
    let body = r#"<h1>Standup</h1>
<p>Plan recurring standups and share what you did, what you will do, and what blocks you.</p>
<p><a href="/login">Log in</a> or <a href="/register">create an account</a>.</p>"#;
    layout("Welcome", None, flashes, body)
}

pub fn login_page(flashes: &[Flash], username: &str) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Username <input name="username" value="{}" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        escape(username)
    );
    layout("Log in", None, flashes, &body)
}

pub fn register_page(flashes: &[Flash]) -> String {
    let body = r#"<h1>Register</h1>
<form method="post" action="/register">
<label>Email <input type="email" name="email" required></label>
<label>Username <input name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirm_password" required></label>
<button type="submit">Register</button>
</form>"#;
    layout("Register", None, flashes, body)
}

pub fn dashboard_page(user: Option<&Credential>, flashes: &[Flash], standups: &[Standup]) -> String {
    let mut body = String::from("<h1>Your standups</h1>");
    if standups.is_empty() {
        body.push_str("<p>No standups yet.</p>");
    } else {
        body.push_str("<ul class=\"standups\">");
        for standup in standups {
            body.push_str(&format!(
                r#"<li><a href="/standups/{id}">{name}</a> {days} at {time} ({tz})</li>"#,
                id = standup.id,
                name = escape(&standup.name),
                days = escape(&standup.days().join(", ")),
                time = escape(&format_time(&standup.time_of_day)),
                tz = escape(&standup.timezone),
            ));
        }
        body.push_str("</ul>");
    }
    layout("Dashboard", user, flashes, &body)
}

/// Values shown in the create/edit form.
#[derive(Debug, Clone, Default)]
pub struct StandupFormValues {
    pub name: String,
    pub days: Vec<String>,
    pub time_of_day: String,
    pub timezone: String,
    pub duration_minutes: String,
    pub facilitator_id: Option<i64>,
    pub member_ids: Vec<i64>,
}

impl From<&Standup> for StandupFormValues {
    fn from(standup: &Standup) -> Self {
        Self {
            name: standup.name.clone(),
            days: standup.days().into_iter().map(str::to_string).collect(),
            time_of_day: standup.time_of_day.clone(),
            timezone: standup.timezone.clone(),
            duration_minutes: standup.duration_minutes.to_string(),
            facilitator_id: standup.facilitator_id,
            member_ids: standup.member_ids(),
        }
    }
}

pub fn standup_form_page(
    user: Option<&Credential>,
    flashes: &[Flash],
    action: &str,
    heading: &str,
    values: &StandupFormValues,
    users: &[User],
) -> String {
    let days: String = WEEKDAYS
        .iter()
        .map(|day| {
            let checked = if values.days.iter().any(|d| d == day) { " checked" } else { "" };
            format!(r#"<label><input type="checkbox" name="days" value="{day}"{checked}> {day}</label>"#)
        })
        .collect();

    let mut zones: Vec<&str> = timezone_names().collect();
    if !values.timezone.is_empty() && !zones.contains(&values.timezone.as_str()) {
        zones.push(&values.timezone);
    }
    let timezones: String = zones
        .iter()
        .map(|tz| {
            let selected = if *tz == values.timezone { " selected" } else { "" };
            format!(r#"<option value="{v}"{selected}>{v}</option>"#, v = escape(tz))
        })
        .collect();

    let facilitators: String = users
        .iter()
        .map(|u| {
            let selected = if values.facilitator_id == Some(u.id) { " selected" } else { "" };
            format!(r#"<option value="{}"{selected}>{}</option>"#, u.id, escape(&u.username))
        })
        .collect();

    let members: String = users
        .iter()
        .map(|u| {
            let checked = if values.member_ids.contains(&u.id) { " checked" } else { "" };
            format!(
                r#"<label><input type="checkbox" name="member_ids" value="{}"{checked}> {}</label>"#,
                u.id,
                escape(&u.username)
            )
        })
        .collect();

    let body = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}">
<label>Name <input name="name" value="{name}" required></label>
<fieldset><legend>Days</legend>{days}</fieldset>
<label>Time <input type="time" name="time_of_day" value="{time}" required></label>
<label>Timezone <select name="timezone">{timezones}</select></label>
<label>Duration (minutes) <input type="number" name="duration" value="{duration}" min="1"></label>
<label>Facilitator <select name="facilitator_id">{facilitators}</select></label>
<fieldset><legend>Members</legend>{members}</fieldset>
<button type="submit">Save</button>
</form>"#,
        heading = escape(heading),
        action = escape(action),
        name = escape(&values.name),
        time = escape(&values.time_of_day),
        duration = escape(&values.duration_minutes),
    );
    layout(heading, user, flashes, &body)
}

pub fn standup_page(
    user: Option<&Credential>,
    flashes: &[Flash],
    standup: &Standup,
    sessions: &[StandupSession],
) -> String {
    let members = standup
        .members
        .iter()
        .map(|m| escape(&m.username))
        .collect::<Vec<_>>()
        .join(", ");

    let mut body = format!(
        r#"<h1>{name}</h1>
<p>{days} at {time} ({tz}), {duration} minutes</p>
<p>Members: {members}</p>"#,
        name = escape(&standup.name),
        days = escape(&standup.days().join(", ")),
        time = escape(&format_time(&standup.time_of_day)),
        tz = escape(&standup.timezone),
        duration = standup.duration_minutes,
    );

    if user.map(|u| u.is_admin()).unwrap_or(false) {
        body.push_str(&format!(r#"<p><a href="/standups/{}/edit">Edit standup</a></p>"#, standup.id));
    }

    body.push_str("<h2>Sessions</h2>");
    if sessions.is_empty() {
        body.push_str("<p>No sessions yet.</p>");
    } else {
        body.push_str("<ul class=\"sessions\">");
        for session in sessions {
            body.push_str(&format!(
                r#"<li><a href="/sessions/{}">{}</a></li>"#,
                session.id,
                escape(&format_date(&session.date))
            ));
        }
        body.push_str("</ul>");
    }

    body.push_str(&format!(
        r#"<form method="post" action="/create_session/{}">
<label>Date <input type="date" name="session_date" required></label>
<button type="submit">Create session</button>
</form>"#,
        standup.id
    ));

    layout(&standup.name, user, flashes, &body)
}

pub fn session_page(
    user: Option<&Credential>,
    flashes: &[Flash],
    session: &StandupSession,
    responses: &[StatusResponse],
    user_has_responded: bool,
) -> String {
    let title = session
        .standup
        .as_ref()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "Session".to_string());

    let mut body = format!(
        "<h1>{}</h1><p>{} ({})</p><h2>Responses</h2>",
        escape(&title),
        escape(&convert_timezone(&session.date, session.timezone(), session.timezone())),
        escape(session.timezone()),
    );

    if responses.is_empty() {
        body.push_str("<p>No responses yet.</p>");
    }
    for response in responses {
        let author = response
            .user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_else(|| format!("user {}", response.user_id));
        // Response timestamps are stored in UTC
        let submitted = response
            .created_at
            .as_deref()
            .map(|at| {
                format!(
                    r#"<p class="submitted">Submitted {}</p>"#,
                    escape(&convert_timezone(at, "UTC", session.timezone()))
                )
            })
            .unwrap_or_default();
        body.push_str(&format!(
            r#"<article class="response"><h3>{}</h3>{}
<p><strong>Yesterday:</strong> {}</p>
<p><strong>Today:</strong> {}</p>
<p><strong>Blockers:</strong> {}</p></article>"#,
            escape(&author),
            submitted,
            escape(&response.yesterday),
            escape(&response.today),
            escape(response.blockers.as_deref().unwrap_or("None")),
        ));
    }

    if !user_has_responded {
        body.push_str(&format!(
            r#"<h2>Your update</h2>
<form method="post" action="/sessions/{}">
<label>Yesterday <textarea name="yesterday" required></textarea></label>
<label>Today <textarea name="today" required></textarea></label>
<label>Blockers <textarea name="blockers"></textarea></label>
<button type="submit">Submit</button>
</form>"#,
            session.id
        ));
    }

    layout(&title, user, flashes, &body)
}
