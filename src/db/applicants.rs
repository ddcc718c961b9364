use crate::db::models::{Applicant, MinAge, NewApplicant};
use crate::db::sqlite::SqlitePool;
use crate::error::CoopError;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Persistence for the `agreement` table.
#[derive(Clone)]
pub struct ApplicantStorage {
    pool: SqlitePool,
}

impl ApplicantStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new applicant and return the stored row.
    /// A second row with the same email fails with `DuplicateEmail`.
    pub async fn create(&self, new: NewApplicant) -> Result<Applicant, CoopError> {
        let created_at = Utc::now().trunc_subsecs(0);
        let res = sqlx::query(
            r#"
            INSERT INTO agreement (
                first_name, last_name, email, company_name, country,
                min_age, agreement_revision_date, password_hash, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.company_name)
        .bind(&new.country)
        .bind(new.min_age.as_str())
        .bind(new.agreement_revision_date.to_string())
        .bind(&new.password_hash)
        .bind(created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CoopError::DuplicateEmail,
            other => CoopError::DatabaseError(other),
        })?;

        let id = res.last_insert_rowid();
        Ok(Applicant {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            company_name: new.company_name,
            country: new.country,
            min_age: new.min_age,
            agreement_revision_date: new.agreement_revision_date,
            password_hash: new.password_hash,
            created_at,
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Applicant>, CoopError> {
        let row = sqlx::query(
            r#"SELECT id, first_name, last_name, email, company_name, country,
               min_age, agreement_revision_date, password_hash, created_at
               FROM agreement WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_model).transpose()
    }

    pub async fn count(&self) -> Result<i64, CoopError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agreement")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    fn row_to_model(row: SqliteRow) -> Result<Applicant, CoopError> {
        let id: i64 = row.try_get("id")?;
        let first_name: String = row.try_get("first_name")?;
        let last_name: String = row.try_get("last_name")?;
        let email: String = row.try_get("email")?;
        let company_name: Option<String> = row.try_get("company_name")?;
        let country: String = row.try_get("country")?;
        let min_age_str: String = row.try_get("min_age")?;
        let revision_str: String = row.try_get("agreement_revision_date")?;
        let password_hash: String = row.try_get("password_hash")?;
        let created_at_secs: i64 = row.try_get("created_at")?;

        let min_age = MinAge::parse(&min_age_str).ok_or_else(|| {
            sqlx::Error::Decode(format!("unexpected min_age value: {min_age_str}").into())
        })?;
        let agreement_revision_date = NaiveDate::parse_from_str(&revision_str, "%Y-%m-%d")
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let created_at = DateTime::<Utc>::from_timestamp(created_at_secs, 0).ok_or_else(|| {
            sqlx::Error::Decode(format!("created_at out of range: {created_at_secs}").into())
        })?;

        Ok(Applicant {
            id,
            first_name,
            last_name,
            email,
            company_name,
            country,
            min_age,
            agreement_revision_date,
            password_hash,
            created_at,
        })
    }
}
