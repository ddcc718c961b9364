use crate::db::models::SessionRecord;
use crate::db::sqlite::SqlitePool;
use crate::error::CoopError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Persistence for the `session` table.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a session that has not yet expired at `now`.
    pub async fn load(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>, CoopError> {
        let row = sqlx::query("SELECT id, data, expires_at FROM session WHERE id = ? AND expires_at > ?")
            .bind(id)
            .bind(now.timestamp())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_model).transpose()
    }

    /// Upsert by id.
    pub async fn save(&self, record: &SessionRecord) -> Result<(), CoopError> {
        let data = serde_json::to_string(&record.data)?;
        sqlx::query(
            r#"
            INSERT INTO session (id, data, expires_at) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&record.id)
        .bind(data)
        .bind(record.expires_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoopError> {
        sqlx::query("DELETE FROM session WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every session whose expiry is at or before `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, CoopError> {
        let res = sqlx::query("DELETE FROM session WHERE expires_at <= ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn count(&self) -> Result<i64, CoopError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    fn row_to_model(row: SqliteRow) -> Result<SessionRecord, CoopError> {
        let id: String = row.try_get("id")?;
        let data_json: String = row.try_get("data")?;
        let expires_at_secs: i64 = row.try_get("expires_at")?;

        let data: Map<String, Value> = serde_json::from_str(&data_json)?;
        let expires_at = DateTime::<Utc>::from_timestamp(expires_at_secs, 0).ok_or_else(|| {
            sqlx::Error::Decode(format!("session expiry out of range: {expires_at_secs}").into())
        })?;

        Ok(SessionRecord {
            id,
            data,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::memory_pool;
    use chrono::Duration;
    use serde_json::json;

    fn record(id: &str, expires_at: DateTime<Utc>) -> SessionRecord {
        let mut data = Map::new();
        data.insert("csrfToken".to_string(), json!("tok"));
        SessionRecord {
            id: id.to_string(),
            data,
            expires_at,
        }
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible_and_swept() {
        let store = SessionStore::new(memory_pool().await);
        let now = Utc::now();
        store.save(&record("live", now + Duration::hours(1))).await.unwrap();
        store.save(&record("dead", now - Duration::seconds(1))).await.unwrap();

        let live = store.load("live", now).await.unwrap().unwrap();
        assert_eq!(live.data.get("csrfToken"), Some(&json!("tok")));
        assert!(store.load("dead", now).await.unwrap().is_none());

        assert_eq!(store.delete_expired(now).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn save_overwrites_existing_row() {
        let store = SessionStore::new(memory_pool().await);
        let now = Utc::now();
        let mut rec = record("s1", now + Duration::hours(1));
        store.save(&rec).await.unwrap();
        rec.data.insert("user".to_string(), json!({"applicant_id": 7}));
        store.save(&rec).await.unwrap();

        let loaded = store.load("s1", now).await.unwrap().unwrap();
        assert_eq!(loaded.data.len(), 2);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
