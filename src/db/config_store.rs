use crate::db::models::ConfigEntry;
use crate::db::sqlite::SqlitePool;
use crate::error::CoopError;

pub const SESSION_SECRET: &str = "session secret";
pub const RECAPTCHA_SITE_KEY: &str = "reCAPTCHA site key";
pub const RECAPTCHA_SECRET_KEY: &str = "reCAPTCHA secret key";

/// Key/value settings persisted in the `config` table.
#[derive(Clone)]
pub struct ConfigStore {
    pool: SqlitePool,
}

impl ConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CoopError> {
        let row: Option<ConfigEntry> =
            sqlx::query_as("SELECT key, value FROM config WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|entry| entry.value))
    }

    /// Like `get`, but absence is an error. Used for bootstrap settings.
    pub async fn require(&self, key: &str) -> Result<String, CoopError> {
        self.get(key)
            .await?
            .ok_or_else(|| CoopError::MissingConfig(key.to_string()))
    }

    /// Upsert by unique key.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), CoopError> {
        sqlx::query(
            r#"
            INSERT INTO config (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert only when `key` is absent. Returns whether a row was written.
    pub async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, CoopError> {
        let res = sqlx::query("INSERT INTO config (key, value) VALUES (?, ?) ON CONFLICT(key) DO NOTHING")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}
