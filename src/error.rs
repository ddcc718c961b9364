use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CoopError {
    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("password and confirmation do not match")]
    PasswordMismatch,

    #[error("CSRF token missing or invalid")]
    CsrfRejected,

    #[error("sign-in failed")]
    SignInFailed,

    #[error("CAPTCHA verification failed")]
    CaptchaRejected,

    #[error("an applicant with this email is already registered")]
    DuplicateEmail,

    #[error("missing config entry `{0}`; run `createdb` first")]
    MissingConfig(String),

    #[error("session secret is unusable: {0}")]
    InvalidSessionSecret(String),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("database URL `{url}` does not match dialect `{dialect}`")]
    Dialect { url: String, dialect: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<figment::Error> for CoopError {
    fn from(e: figment::Error) -> Self {
        CoopError::Config(Box::new(e))
    }
}

impl From<argon2::password_hash::Error> for CoopError {
    fn from(e: argon2::password_hash::Error) -> Self {
        CoopError::PasswordHash(e.to_string())
    }
}

impl CoopError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoopError::Validation { .. } | CoopError::PasswordMismatch => StatusCode::BAD_REQUEST,
            CoopError::CsrfRejected | CoopError::SignInFailed | CoopError::CaptchaRejected => {
                StatusCode::FORBIDDEN
            }
            CoopError::DuplicateEmail => StatusCode::CONFLICT,
            CoopError::Reqwest(_) => StatusCode::BAD_GATEWAY,
            CoopError::MissingConfig(_)
            | CoopError::InvalidSessionSecret(_)
            | CoopError::Config(_)
            | CoopError::Dialect { .. }
            | CoopError::DatabaseError(_)
            | CoopError::Json(_)
            | CoopError::Io(_)
            | CoopError::PasswordHash(_)
            | CoopError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoopError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = self.to_string();
        let error_body = match &self {
            CoopError::Validation { .. } | CoopError::PasswordMismatch => ApiErrorBody {
                code: "BAD_REQUEST".to_string(),
                message,
            },
            CoopError::CsrfRejected | CoopError::CaptchaRejected => ApiErrorBody {
                code: "FORBIDDEN".to_string(),
                message,
            },
            // One body for unknown email and wrong password alike.
            CoopError::SignInFailed => ApiErrorBody {
                code: "FORBIDDEN".to_string(),
                message: "Invalid email or password.".to_string(),
            },
            CoopError::DuplicateEmail => ApiErrorBody {
                code: "CONFLICT".to_string(),
                message,
            },
            CoopError::Reqwest(_) => ApiErrorBody {
                code: "BAD_GATEWAY".to_string(),
                message: "Upstream service is unavailable.".to_string(),
            },
            other => {
                tracing::error!(error = %other, "request failed with internal error");
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                }
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
