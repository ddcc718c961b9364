//! Server-side sessions keyed by an encrypted cookie.
//!
//! The cookie only carries the session id; state lives in the `session`
//! table. Sessions slide their expiry forward on every commit and are
//! never loaded once expired. A background sweep removes dead rows.

pub mod csrf;

use crate::db::models::SessionRecord;
use crate::db::sessions::SessionStore;
use crate::error::CoopError;
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::{RngCore, rngs::OsRng};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const SESSION_COOKIE: &str = "coop_sid";

const TOKEN_BYTES: usize = 32;

/// 256 bits from the OS RNG, URL-safe base64 without padding.
pub(crate) fn random_token() -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut raw);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw)
}

#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    data: Map<String, Value>,
    expires_at: DateTime<Utc>,
    is_new: bool,
}

impl Session {
    fn fresh(ttl: Duration) -> Self {
        Self {
            id: random_token(),
            data: Map::new(),
            expires_at: expiry_from_now(ttl),
            is_new: true,
        }
    }

    fn from_record(record: SessionRecord) -> Self {
        Self {
            id: record.id,
            data: record.data,
            expires_at: record.expires_at,
            is_new: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True until the session is first committed.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn insert<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), CoopError> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id.clone(),
            data: self.data.clone(),
            expires_at: self.expires_at,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_session() -> Session {
    Session::fresh(Duration::from_secs(60))
}

/// Saturates at the latest representable instant for oversized TTLs.
fn expiry_from_now(ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Loads, persists and expires sessions.
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionManager {
    pub fn new(store: SessionStore, ttl: Duration, secure_cookie: bool) -> Self {
        Self {
            store,
            ttl,
            secure_cookie,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Resolve the session referenced by the cookie jar, or start a new one.
    /// New sessions are not written until `commit`.
    pub async fn load_or_create(&self, jar: &PrivateCookieJar) -> Result<Session, CoopError> {
        if let Some(sid) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
            if let Some(record) = self.store.load(&sid, Utc::now()).await? {
                return Ok(Session::from_record(record));
            }
            debug!("session cookie refers to an unknown or expired session");
        }
        Ok(Session::fresh(self.ttl))
    }

    /// Extend the expiry, persist the session and (re)issue its cookie.
    pub async fn commit(
        &self,
        session: &mut Session,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, CoopError> {
        session.expires_at = expiry_from_now(self.ttl);
        self.store.save(&session.to_record()).await?;
        session.is_new = false;
        Ok(jar.add(self.build_cookie(session.id.clone())))
    }

    /// Move the session to a fresh id, dropping the old row.
    pub async fn rotate(&self, session: &mut Session) -> Result<(), CoopError> {
        let old_id = std::mem::replace(&mut session.id, random_token());
        if !session.is_new {
            self.store.delete(&old_id).await?;
        }
        session.is_new = true;
        Ok(())
    }

    pub async fn sweep_expired(&self) -> Result<u64, CoopError> {
        self.store.delete_expired(Utc::now()).await
    }

    /// Periodically delete expired sessions until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match manager.sweep_expired().await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "swept expired sessions"),
                    Err(e) => warn!(error = %e, "session sweep failed"),
                }
            }
        })
    }

    fn build_cookie(&self, value: String) -> Cookie<'static> {
        let max_age = time::Duration::seconds(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX));
        Cookie::build(Cookie::new(SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }
}
