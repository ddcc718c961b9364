//! SQL DDL for the membership database.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `config`: key/value bootstrap settings (session secret, reCAPTCHA keys)
/// - `session`: server-side session state, JSON payload, unix-second expiry
/// - `agreement`: one row per completed registration, `email` UNIQUE
/// - `min_age` constrained to the single literal `'18'`
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS config (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session (
    id TEXT PRIMARY KEY NOT NULL,
    data TEXT NOT NULL, -- JSON object
    expires_at INTEGER NOT NULL -- unix seconds
);

CREATE INDEX IF NOT EXISTS idx_session_expires_at ON session(expires_at);

CREATE TABLE IF NOT EXISTS agreement (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    company_name TEXT NULL,
    country TEXT NOT NULL,
    min_age TEXT NOT NULL CHECK (min_age = '18'),
    agreement_revision_date TEXT NOT NULL, -- ISO 8601 date
    password_hash TEXT NOT NULL, -- PHC string
    created_at INTEGER NOT NULL
)
"#;
