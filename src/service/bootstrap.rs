//! Administrative entry points: schema creation, key import, server start.

use crate::config::Config;
use crate::db::config_store::SESSION_SECRET;
use crate::db::{ApplicantStorage, ConfigStore, SessionStore, SqlitePool, connect, init_schema};
use crate::error::CoopError;
use crate::pages::Pages;
use crate::router::{CoopState, coop_router};
use crate::service::captcha::{RecaptchaKeys, RecaptchaVerifier};
use crate::service::membership::Membership;
use crate::service::password::prime_dummy_hash;
use crate::session::SessionManager;
use axum_extra::extract::cookie::Key;
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Bytes of entropy in a freshly seeded session secret (the cookie key minimum).
const SESSION_SECRET_BYTES: usize = 64;

fn generate_session_secret() -> String {
    let mut raw = [0u8; SESSION_SECRET_BYTES];
    OsRng.fill_bytes(&mut raw);
    base64::engine::general_purpose::STANDARD.encode(raw)
}

/// Decode the stored secret into the cookie encryption key.
pub fn session_key(secret: &str) -> Result<Key, CoopError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(secret.trim())
        .map_err(|e| CoopError::InvalidSessionSecret(e.to_string()))?;
    Key::try_from(raw.as_slice()).map_err(|e| CoopError::InvalidSessionSecret(e.to_string()))
}

/// Create the schema and seed the session secret unless one exists.
/// Returns whether a new secret was written.
pub async fn prepare_database(pool: &SqlitePool) -> Result<bool, CoopError> {
    init_schema(pool).await?;
    let seeded = ConfigStore::new(pool.clone())
        .set_if_absent(SESSION_SECRET, &generate_session_secret())
        .await?;
    if seeded {
        info!("seeded session secret");
    } else {
        info!("session secret already present; left unchanged");
    }
    Ok(seeded)
}

/// Assemble request-handling state. Fails when the session secret is absent.
pub async fn build_state(cfg: &Config, pool: SqlitePool) -> Result<CoopState, CoopError> {
    let config_store = ConfigStore::new(pool.clone());
    let key = session_key(&config_store.require(SESSION_SECRET).await?)?;

    if !tokio::task::spawn_blocking(prime_dummy_hash).await? {
        warn!("dummy password hash unavailable; unknown-email sign-ins skip the decoy verify");
    }

    let pages = Arc::new(Pages::bundled());
    let captcha = RecaptchaKeys::load(&config_store).await?.map(|keys| {
        RecaptchaVerifier::new(reqwest::Client::new(), keys, cfg.recaptcha_verify_url.clone())
    });
    info!(captcha = captcha.is_some(), "registration CAPTCHA");

    let sessions = SessionManager::new(
        SessionStore::new(pool.clone()),
        cfg.session_ttl(),
        !cfg.insecure_cookie,
    );
    let membership = Membership::new(
        ApplicantStorage::new(pool),
        captcha,
        pages.agreement.revision_date,
    );
    Ok(CoopState::new(pages, sessions, membership, key))
}

pub async fn create_db(cfg: &Config) -> Result<(), CoopError> {
    let pool = connect(&cfg.database_url).await?;
    prepare_database(&pool).await?;
    Ok(())
}

pub async fn import_recaptcha_keys(cfg: &Config, path: &Path) -> Result<(), CoopError> {
    let keys = RecaptchaKeys::from_file(path)?;
    let pool = connect(&cfg.database_url).await?;
    init_schema(&pool).await?;
    keys.save(&ConfigStore::new(pool)).await?;
    info!(path = %path.display(), "imported reCAPTCHA keys");
    Ok(())
}

pub async fn serve(cfg: &Config) -> Result<(), CoopError> {
    let pool = connect(&cfg.database_url).await?;
    let state = build_state(cfg, pool).await?;

    let removed = state.sessions.sweep_expired().await?;
    info!(removed, "startup session sweep");
    let sweeper = state.sessions.spawn_sweeper(cfg.session_sweep_interval());

    let app = coop_router(state);
    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
