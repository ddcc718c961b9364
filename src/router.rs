use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::get,
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use crate::handlers::{pages, register, sign_in};
use crate::pages::Pages;
use crate::service::membership::Membership;
use crate::session::SessionManager;

const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct CoopState {
    pub pages: Arc<Pages>,
    pub sessions: SessionManager,
    pub membership: Membership,
    key: Key,
}

impl CoopState {
    pub fn new(
        pages: Arc<Pages>,
        sessions: SessionManager,
        membership: Membership,
        key: Key,
    ) -> Self {
        Self {
            pages,
            sessions,
            membership,
            key,
        }
    }
}

impl FromRef<CoopState> for Key {
    fn from_ref(state: &CoopState) -> Self {
        state.key.clone()
    }
}

impl FromRef<CoopState> for SessionManager {
    fn from_ref(state: &CoopState) -> Self {
        state.sessions.clone()
    }
}

pub fn coop_router(state: CoopState) -> Router {
    let paths = state.pages.paths;
    Router::new()
        .route(paths.index, get(pages::home))
        .route(
            paths.register,
            get(pages::register_form).post(register::register_submit),
        )
        .route(
            paths.sign_in,
            get(pages::sign_in_form).post(sign_in::sign_in_submit),
        )
        .route(paths.agreement, get(pages::agreement))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
