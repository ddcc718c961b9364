#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use coop_membership::config::Config;
use coop_membership::db::ConfigStore;
use coop_membership::service::captcha::RecaptchaKeys;
use coop_membership::service::bootstrap;
use coop_membership::{CoopState, coop_router};
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: CoopState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(
        Config {
            insecure_cookie: true,
            ..Config::default()
        },
        None,
    )
    .await
}

/// Build an app over a fresh in-memory database, storing `recaptcha` first
/// so registration is gated on the configured verifier.
pub async fn spawn_app_with(cfg: Config, recaptcha: Option<RecaptchaKeys>) -> TestApp {
    let pool = coop_membership::db::connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    bootstrap::prepare_database(&pool)
        .await
        .expect("failed to prepare database");
    if let Some(keys) = recaptcha {
        keys.save(&ConfigStore::new(pool.clone()))
            .await
            .expect("failed to store reCAPTCHA keys");
    }

    let state = bootstrap::build_state(&cfg, pool)
        .await
        .expect("failed to build state");
    let app = coop_router(state.clone());
    TestApp { app, state }
}

impl TestApp {
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::empty()).expect("failed to build request"))
            .await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::from(body)).expect("failed to build request"))
            .await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let resp = self.app.clone().oneshot(req).await.expect("request failed");
        let status = resp.status();
        let cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = String::from_utf8(body.to_vec()).expect("response body was not utf-8");
        TestResponse {
            status,
            cookie,
            content_type,
            body,
        }
    }

    pub async fn applicant_count(&self) -> i64 {
        self.state
            .membership
            .applicants()
            .count()
            .await
            .expect("count applicants")
    }

    /// Render the registration form and return (session cookie, CSRF token).
    pub async fn open_form(&self, uri: &str) -> (String, String) {
        let resp = self.get(uri, None).await;
        assert_eq!(resp.status, StatusCode::OK);
        let cookie = resp.cookie.expect("form page did not set a session cookie");
        (cookie, extract_csrf(&resp.body))
    }
}

pub fn extract_csrf(html: &str) -> String {
    let marker = r#"name="_csrf" value=""#;
    let start = html.find(marker).expect("no CSRF field in page") + marker.len();
    let len = html[start..].find('"').expect("unterminated CSRF value");
    html[start..start + len].to_string()
}

pub fn registration<'a>(csrf: &'a str, email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("_csrf", csrf),
        ("firstName", "Ada"),
        ("lastName", "Lovelace"),
        ("email", email),
        ("companyName", "Analytical Engines"),
        ("country", "UK"),
        ("verifiedYears", "on"),
        ("password", "Abc12345"),
        ("confirmPassword", "Abc12345"),
    ]
}
