mod entities;
mod errors;
mod settings;
mod storage;
mod tokens;
mod validate;
mod web;

use clap::Parser;
use migration::MigratorTrait;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "eyesonasset",
    version,
    about = "Asset tracking API for owners and their physical assets"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(
        host = %settings.server.host,
        port = settings.server.port,
        database = %settings.database.url,
        "Loaded configuration"
    );

    // init storage (database) and bring the schema up to date
    let db = storage::init(&settings.database).await?;
    migration::Migrator::up(&db, None).await.into_diagnostic()?;

    // token signer over the configured secret
    let tokens = tokens::TokenSigner::new(settings.auth.clone());

    // start web server
    web::serve(settings, db, tokens).await?;
    Ok(())
}
