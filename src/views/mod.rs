//! Minimal server-side HTML.
//!
//! Pages are plain strings; every interpolated value goes through [`escape`].

mod pages;

pub use pages::*;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::session::{Credential, Flash};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

const DATE_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// ISO timestamp without an offset. A bare date means midnight.
fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(value, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// `2024-03-01T09:30:00Z` -> `2024-03-01 09:30 AM`. Unparseable input passes through.
pub fn format_date(value: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format(DATE_FORMAT).to_string();
    }
    match parse_naive(value) {
        Some(dt) => dt.format(DATE_FORMAT).to_string(),
        None => value.to_string(),
    }
}

/// Render `value` in `target_tz`. A timestamp without an offset is taken to be
/// in `source_tz`. Unparseable input or unknown zones pass through unchanged.
pub fn convert_timezone(value: &str, source_tz: &str, target_tz: &str) -> String {
    let (Ok(source), Ok(target)) = (source_tz.parse::<Tz>(), target_tz.parse::<Tz>()) else {
        return value.to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&target).format(DATE_FORMAT).to_string();
    }

    // Nonexistent local times (spring-forward gaps) have no instant to convert
    parse_naive(value)
        .and_then(|naive| source.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&target).format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

/// `14:30:00` or `14:30` -> `02:30 PM`. Unparseable input passes through.
pub fn format_time(value: &str) -> String {
    ["%H:%M:00", "%H:%M"]
        .iter()
        .find_map(|pattern| NaiveTime::parse_from_str(value, pattern).ok())
        .map(|time| time.format("%I:%M %p").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Every IANA zone name, for the standup form.
pub fn timezone_names() -> impl Iterator<Item = &'static str> {
    chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name())
}

fn render_flashes(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .collect()
}

fn render_nav(user: Option<&Credential>) -> String {
    match user {
        Some(credential) => {
            let name = credential.username.as_deref().unwrap_or("user");
            let mut nav = String::from(r#"<a href="/dashboard">Dashboard</a>"#);
            if credential.is_admin() {
                nav.push_str(r#" <a href="/standups/new">New standup</a>"#);
            }
            nav.push_str(&format!(
                r#" <span class="user">{}</span> <a href="/logout">Log out</a>"#,
                escape(name)
            ));
            nav
        }
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#.to_string(),
    }
}

pub fn layout(title: &str, user: Option<&Credential>, flashes: &[Flash], body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Standup</title>
</head>
<body>
<nav>{nav}</nav>
<main>
{flashes}
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = render_nav(user),
        flashes = render_flashes(flashes),
        body = body,
    )
}

pub fn error_page(message: &str) -> String {
    layout("Error", None, &[], &format!("<h1>Error</h1><p>{}</p>", escape(message)))
}
