use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

/// Minimum-age attestation. Only ever "18".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinAge {
    #[serde(rename = "18")]
    Eighteen,
}

impl MinAge {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MinAge::Eighteen => "18",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        (raw == "18").then_some(MinAge::Eighteen)
    }
}

/// Applicant fields ready for insertion; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplicant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub country: String,
    pub min_age: MinAge,
    pub agreement_revision_date: NaiveDate,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Applicant {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub country: String,
    pub min_age: MinAge,
    pub agreement_revision_date: NaiveDate,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Raw `session` row, decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub data: Map<String, Value>,
    pub expires_at: DateTime<Utc>,
}
