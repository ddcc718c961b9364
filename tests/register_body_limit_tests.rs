mod common;

use axum::http::StatusCode;
use common::{registration, spawn_app};

#[tokio::test]
async fn register_rejects_form_over_body_limit() {
    let app = spawn_app().await;
    let (cookie, csrf) = app.open_form("/register").await;

    let pad = "x".repeat(70 * 1024);
    let mut fields = registration(&csrf, "ada@example.com");
    fields.push(("pad", pad.as_str()));
    let resp = app.post_form("/register", Some(&cookie), &fields).await;

    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.applicant_count().await, 0);
}

#[tokio::test]
async fn register_accepts_form_under_body_limit() {
    let app = spawn_app().await;
    let (cookie, csrf) = app.open_form("/register").await;

    let pad = "x".repeat(16 * 1024);
    let mut fields = registration(&csrf, "ada@example.com");
    fields.push(("pad", pad.as_str()));
    let resp = app.post_form("/register", Some(&cookie), &fields).await;

    assert_eq!(resp.status, StatusCode::OK, "body: {}", resp.body);
    assert_eq!(app.applicant_count().await, 1);
}
