//! Per-session CSRF tokens.
//!
//! A token is minted only when a form is rendered and lives in the session
//! until rotated. Verification compares in constant time.

use super::{Session, random_token};
use crate::error::CoopError;
use subtle::ConstantTimeEq;

/// Session data key holding the token.
pub const CSRF_SESSION_KEY: &str = "csrfToken";
/// Form field the rendered pages echo the token back in.
pub const CSRF_FORM_FIELD: &str = "_csrf";

/// Return the session's token, minting one if it has none yet.
pub fn issue_or_reuse_csrf_token(session: &mut Session) -> Result<String, CoopError> {
    if let Some(existing) = session.get_str(CSRF_SESSION_KEY) {
        return Ok(existing.to_owned());
    }
    rotate_csrf_token(session)
}

/// Replace the session's token unconditionally.
pub fn rotate_csrf_token(session: &mut Session) -> Result<String, CoopError> {
    let token = random_token();
    session.insert(CSRF_SESSION_KEY, &token)?;
    Ok(token)
}

pub fn verify_csrf_token(session: &Session, submitted: Option<&str>) -> bool {
    let (Some(expected), Some(submitted)) = (session.get_str(CSRF_SESSION_KEY), submitted) else {
        return false;
    };
    bool::from(expected.as_bytes().ct_eq(submitted.as_bytes()))
}
