use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Key, PrivateCookieJar};

use crate::error::CoopError;
use crate::session::{Session, SessionManager};

/// The caller's session plus the cookie jar it came from.
///
/// A browser without a valid session cookie gets a fresh, unsaved session.
/// Handlers hand both back to `SessionManager::commit` to persist changes
/// and refresh the cookie.
pub struct BrowserSession {
    pub session: Session,
    pub jar: PrivateCookieJar,
}

impl<S> FromRequestParts<S> for BrowserSession
where
    S: Send + Sync,
    Key: FromRef<S>,
    SessionManager: FromRef<S>,
{
    type Rejection = CoopError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        let session = SessionManager::from_ref(state).load_or_create(&jar).await?;
        Ok(Self { session, jar })
    }
}
