use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::middleware::BrowserSession;
use crate::pages::escape_html;
use crate::router::CoopState;
use crate::service::membership::{AUTH_SESSION_KEY, FormFields};
use crate::session::csrf::rotate_csrf_token;
use crate::CoopError;

/// POST /signIn -> verify credentials and mark the session as signed in.
///
/// The session moves to a new id and a new CSRF token on success.
pub async fn sign_in_submit(
    State(state): State<CoopState>,
    BrowserSession { mut session, jar }: BrowserSession,
    Form(form): Form<FormFields>,
) -> Result<Response, CoopError> {
    let identity = state.membership.sign_in(&session, form).await?;

    state.sessions.rotate(&mut session).await?;
    rotate_csrf_token(&mut session)?;
    session.insert(AUTH_SESSION_KEY, &identity)?;
    let jar = state.sessions.commit(&mut session, jar).await?;

    let body = format!("<p>Welcome back, {}</p>", escape_html(&identity.first_name));
    Ok((jar, Html(body)).into_response())
}
