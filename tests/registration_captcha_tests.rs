mod common;

use std::collections::HashMap;

use axum::{Form, Json, Router, http::StatusCode, routing::post};
use coop_membership::config::Config;
use coop_membership::service::captcha::{RECAPTCHA_RESPONSE_FIELD, RecaptchaKeys};
use common::{TestApp, registration, spawn_app_with};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

const SECRET: &str = "test-secret";

/// Local stand-in for `siteverify`: accepts only `response=good` sent with
/// the configured secret.
async fn spawn_siteverify() -> Url {
    async fn siteverify(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
        let ok = form.get("secret").map(String::as_str) == Some(SECRET)
            && form.get("response").map(String::as_str) == Some("good");
        if ok {
            Json(json!({ "success": true }))
        } else {
            Json(json!({ "success": false, "error-codes": ["invalid-input-response"] }))
        }
    }

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock verifier");
    let addr = listener.local_addr().expect("mock verifier address");
    let app = Router::new().route("/siteverify", post(siteverify));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock verifier failed");
    });
    Url::parse(&format!("http://{addr}/siteverify")).expect("mock verifier url")
}

async fn captcha_app(verify_url: Url) -> TestApp {
    let cfg = Config {
        insecure_cookie: true,
        recaptcha_verify_url: verify_url,
        ..Config::default()
    };
    let keys = RecaptchaKeys {
        site_key: "test-site".to_string(),
        secret_key: SECRET.to_string(),
    };
    spawn_app_with(cfg, Some(keys)).await
}

#[tokio::test]
async fn register_page_embeds_the_site_key_when_captcha_is_configured() {
    let app = captcha_app(spawn_siteverify().await).await;
    let resp = app.get("/register", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"data-sitekey="test-site""#), "body: {}", resp.body);
}

#[tokio::test]
async fn accepted_captcha_token_registers_the_applicant() {
    let app = captcha_app(spawn_siteverify().await).await;
    let (cookie, csrf) = app.open_form("/register").await;

    let mut fields = registration(&csrf, "ada@example.com");
    fields.push((RECAPTCHA_RESPONSE_FIELD, "good"));
    let resp = app.post_form("/register", Some(&cookie), &fields).await;

    assert_eq!(resp.status, StatusCode::OK, "body: {}", resp.body);
    assert_eq!(app.applicant_count().await, 1);
}

#[tokio::test]
async fn rejected_captcha_token_returns_403_and_stores_nothing() {
    let app = captcha_app(spawn_siteverify().await).await;
    let (cookie, csrf) = app.open_form("/register").await;

    let mut fields = registration(&csrf, "ada@example.com");
    fields.push((RECAPTCHA_RESPONSE_FIELD, "bad"));
    let resp = app.post_form("/register", Some(&cookie), &fields).await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    let body: Value = serde_json::from_str(&resp.body).expect("error body is JSON");
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["message"], "CAPTCHA verification failed");
    assert_eq!(app.applicant_count().await, 0);
}

#[tokio::test]
async fn missing_captcha_token_returns_403() {
    let app = captcha_app(spawn_siteverify().await).await;
    let (cookie, csrf) = app.open_form("/register").await;

    let resp = app
        .post_form("/register", Some(&cookie), &registration(&csrf, "ada@example.com"))
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(app.applicant_count().await, 0);
}

#[tokio::test]
async fn unreachable_verifier_returns_502_and_stores_nothing() {
    let unreachable = Url::parse("http://127.0.0.1:9/siteverify").expect("url");
    let app = captcha_app(unreachable).await;
    let (cookie, csrf) = app.open_form("/register").await;

    let mut fields = registration(&csrf, "ada@example.com");
    fields.push((RECAPTCHA_RESPONSE_FIELD, "good"));
    let resp = app.post_form("/register", Some(&cookie), &fields).await;

    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
    assert_eq!(app.applicant_count().await, 0);
}
