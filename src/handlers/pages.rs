use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
};

use crate::middleware::BrowserSession;
use crate::router::CoopState;
use crate::session::csrf::issue_or_reuse_csrf_token;
use crate::CoopError;

/// GET / -> home page with the sign-in form.
pub async fn home(
    State(state): State<CoopState>,
    BrowserSession { mut session, jar }: BrowserSession,
) -> Result<Response, CoopError> {
    let token = issue_or_reuse_csrf_token(&mut session)?;
    let html = state.pages.render_index(&token);
    let jar = state.sessions.commit(&mut session, jar).await?;
    Ok((jar, Html(html)).into_response())
}

/// GET /register -> registration form, with the reCAPTCHA widget when configured.
pub async fn register_form(
    State(state): State<CoopState>,
    BrowserSession { mut session, jar }: BrowserSession,
) -> Result<Response, CoopError> {
    let token = issue_or_reuse_csrf_token(&mut session)?;
    let html = state
        .pages
        .render_register(&token, state.membership.recaptcha_site_key());
    let jar = state.sessions.commit(&mut session, jar).await?;
    Ok((jar, Html(html)).into_response())
}

/// GET /signIn -> standalone sign-in form.
pub async fn sign_in_form(
    State(state): State<CoopState>,
    BrowserSession { mut session, jar }: BrowserSession,
) -> Result<Response, CoopError> {
    let token = issue_or_reuse_csrf_token(&mut session)?;
    let html = state.pages.render_sign_in(&token);
    let jar = state.sessions.commit(&mut session, jar).await?;
    Ok((jar, Html(html)).into_response())
}

/// GET /Coop_Membership_Agreement -> agreement source as plain text.
pub async fn agreement(State(state): State<CoopState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.pages.agreement.text,
    )
}
