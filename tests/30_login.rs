mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::{location, TestApp};

#[tokio::test]
async fn login_stores_credential_and_identity() -> Result<()> {
    let app = TestApp::spawn().await?;

    assert_eq!(app.login("alice", "secret").await?, "/dashboard");

    let body = app.page("/dashboard").await?;
    assert!(body.contains("Welcome back, alice!"));
    assert!(body.contains("Platform"));

    let token_calls = app.upstream.calls_to("/token");
    assert_eq!(token_calls.len(), 1);
    assert_eq!(token_calls[0].authorization, None);

    let identity = app.upstream.calls_to("/users/me/");
    assert_eq!(identity[0].authorization.as_deref(), Some("Bearer A1"));
    let standups = app.upstream.calls_to("/standups/");
    assert_eq!(standups[0].authorization.as_deref(), Some("Bearer A1"));
    Ok(())
}

#[tokio::test]
async fn flash_is_shown_once() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.login("alice", "secret").await?;

    assert!(app.page("/dashboard").await?.contains("Welcome back, alice!"));
    assert!(!app.page("/dashboard").await?.contains("Welcome back, alice!"));
    Ok(())
}

#[tokio::test]
async fn wrong_password_reads_invalid_credentials() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_form("/login", &[("username", "alice"), ("password", "nope")])
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await?;
    assert!(body.contains("Invalid username or password"));
    assert!(app.upstream.calls_to("/users/me/").is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_identity_lookup_is_not_a_login() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_form("/login", &[("username", "ghost"), ("password", "secret")])
        .await?;
    assert!(res.text().await?.contains("Invalid username or password"));

    let res = app.get("/dashboard").await?;
    assert_eq!(location(&res).as_deref(), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn stale_token_at_login_is_refreshed_for_identity() -> Result<()> {
    let app = TestApp::spawn().await?;

    assert_eq!(app.login("stale", "secret").await?, "/dashboard");
    app.page("/dashboard").await?;

    assert_eq!(app.upstream.calls_to("/token/refresh").len(), 1);
    let standups = app.upstream.calls_to("/standups/");
    assert_eq!(standups[0].authorization.as_deref(), Some("Bearer A2"));
    Ok(())
}

#[tokio::test]
async fn refreshed_token_is_written_back_to_the_cookie() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.login("stale", "secret").await?;

    app.page("/dashboard").await?;
    app.page("/dashboard").await?;

    // Only the login needed a refresh; later requests reuse the stored A2
    assert_eq!(app.upstream.calls_to("/token/refresh").len(), 1);
    assert!(app
        .upstream
        .calls_to("/standups/")
        .iter()
        .all(|c| c.authorization.as_deref() == Some("Bearer A2")));
    Ok(())
}

#[tokio::test]
async fn logout_is_local_and_clears_the_session() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.login("alice", "secret").await?;
    app.upstream.reset();

    let res = app.get("/logout").await?;
    assert_eq!(location(&res).as_deref(), Some("/"));
    assert!(app.upstream.calls().is_empty());

    let landing = app.page("/").await?;
    assert!(landing.contains("You have been logged out"));

    let res = app.get("/dashboard").await?;
    assert_eq!(location(&res).as_deref(), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn logged_in_visitor_skips_the_landing_page() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.login("alice", "secret").await?;

    let res = app.get("/").await?;
    assert_eq!(location(&res).as_deref(), Some("/dashboard"));
    Ok(())
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_api() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_form(
            "/register",
            &[
                ("email", "new@example.com"),
                ("username", "newbie"),
                ("password", "one"),
                ("confirm_password", "two"),
            ],
        )
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await?.contains("Passwords do not match"));
    assert!(app.upstream.calls_to("/users/").is_empty());
    Ok(())
}

#[tokio::test]
async fn registration_redirects_to_login() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_form(
            "/register",
            &[
                ("email", "new@example.com"),
                ("username", "newbie"),
                ("password", "pw"),
                ("confirm_password", "pw"),
            ],
        )
        .await?;

    assert_eq!(location(&res).as_deref(), Some("/login"));
    assert!(app.page("/login").await?.contains("Registration successful! Please log in."));
    Ok(())
}

#[tokio::test]
async fn registration_shows_upstream_detail() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_form(
            "/register",
            &[
                ("email", "taken@example.com"),
                ("username", "taken"),
                ("password", "pw"),
                ("confirm_password", "pw"),
            ],
        )
        .await?;

    assert!(res
        .text()
        .await?
        .contains("Registration failed: Username already registered"));
    Ok(())
}

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/health").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}
