//! Database module: models, schema and per-table storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool construction and schema bootstrap
//! - `config_store.rs`, `sessions.rs`, `applicants.rs`: one storage type per table

pub mod applicants;
pub mod config_store;
pub mod models;
pub mod schema;
pub mod sessions;
pub mod sqlite;

pub use applicants::ApplicantStorage;
pub use config_store::ConfigStore;
pub use models::{Applicant, ConfigEntry, MinAge, NewApplicant, SessionRecord};
pub use schema::SQLITE_INIT;
pub use sessions::SessionStore;
pub use sqlite::{SqlitePool, connect, init_schema};
