use crate::config::{Dialect, Overrides};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "coop-membership",
    version,
    about = "Co-op membership registration service"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// TOML configuration file; missing files are ignored
    #[arg(long, global = true, env = "COOP_CONFIG", default_value = "coop.toml")]
    pub config: PathBuf,

    /// Database URI, e.g. `sqlite:coop.db`
    #[arg(long = "db", global = true)]
    pub database_url: Option<String>,

    #[arg(long, global = true, value_enum)]
    pub dialect: Option<Dialect>,

    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Log filter, e.g. `info` or `coop_membership=debug`
    #[arg(long, global = true)]
    pub loglevel: Option<String>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            database_url: self.database_url.clone(),
            dialect: self.dialect,
            port: self.port,
            loglevel: self.loglevel.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the schema and seed the session secret
    Createdb,
    /// Run the HTTP server
    Start,
    /// Load reCAPTCHA keys from a JSON file into the config table
    #[command(name = "recaptcha-config", alias = "recapchaConfig")]
    RecaptchaConfig {
        #[arg(default_value = "recaptcha.json")]
        path: PathBuf,
    },
}
