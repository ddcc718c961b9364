use clap::Parser;
use coop_membership::cli::{Cli, Command};
use coop_membership::config::Config;
use coop_membership::service::bootstrap;
use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.global.config, &cli.global.overrides())?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        dialect = cfg.dialect.as_str(),
        port = cfg.port,
        loglevel = %cfg.loglevel
    );

    let result = match cli.command {
        Command::Createdb => bootstrap::create_db(&cfg).await,
        Command::Start => bootstrap::serve(&cfg).await,
        Command::RecaptchaConfig { path } => bootstrap::import_recaptcha_keys(&cfg, &path).await,
    };
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result?;
    Ok(())
}
