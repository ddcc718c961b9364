use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::middleware::BrowserSession;
use crate::pages::escape_html;
use crate::router::CoopState;
use crate::service::membership::FormFields;
use crate::CoopError;

/// POST /register -> create the applicant and acknowledge by first name.
pub async fn register_submit(
    State(state): State<CoopState>,
    BrowserSession { mut session, jar }: BrowserSession,
    Form(form): Form<FormFields>,
) -> Result<Response, CoopError> {
    let applicant = state.membership.register(&session, form).await?;
    let jar = state.sessions.commit(&mut session, jar).await?;
    let body = format!("<p>Welcome, {}</p>", escape_html(&applicant.first_name));
    Ok((jar, Html(body)).into_response())
}
