//! Layered runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! `COOP_*` environment variables, then command-line overrides.

use crate::error::CoopError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const ENV_PREFIX: &str = "COOP_";

/// Storage dialects understood by the `--dialect` flag. Only SQLite is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub dialect: Dialect,
    pub listen_addr: String,
    pub port: u16,
    pub loglevel: String,
    /// Drop the `Secure` attribute from the session cookie (plain-HTTP development).
    pub insecure_cookie: bool,
    pub session_ttl_secs: u64,
    pub session_sweep_secs: u64,
    pub recaptcha_verify_url: Url,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:coop.db".to_string(),
            dialect: Dialect::Sqlite,
            listen_addr: "0.0.0.0".to_string(),
            port: 3000,
            loglevel: "info".to_string(),
            insecure_cookie: false,
            session_ttl_secs: 24 * 60 * 60,
            session_sweep_secs: 15 * 60,
            recaptcha_verify_url: Url::parse("https://www.google.com/recaptcha/api/siteverify")
                .expect("static reCAPTCHA URL is valid"),
        }
    }
}

/// Values supplied on the command line. `None` leaves lower layers untouched.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loglevel: Option<String>,
}

impl Config {
    pub fn figment(file: &Path, overrides: &Overrides) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    pub fn load(file: &Path, overrides: &Overrides) -> Result<Self, CoopError> {
        let cfg: Config = Self::figment(file, overrides).extract()?;
        cfg.check_dialect()?;
        Ok(cfg)
    }

    fn check_dialect(&self) -> Result<(), CoopError> {
        let scheme_ok = match self.dialect {
            Dialect::Sqlite => self.database_url.starts_with("sqlite:"),
        };
        if scheme_ok {
            Ok(())
        } else {
            Err(CoopError::Dialect {
                url: self.database_url.clone(),
                dialect: self.dialect.as_str().to_string(),
            })
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_secs.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }
}
