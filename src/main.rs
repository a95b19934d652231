use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use foodgram::{
    actions::PgStore,
    api::{self, AppState},
    config::ServerConfig,
    jwt::SessionKeys,
    DEFAULT_LOG_FILTER,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe sharing API server")]
struct Args {
    /// Optional TOML file; environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load(args.config.as_deref())?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database ready");

    let keys = SessionKeys::new(config.jwt_secret.as_bytes(), config.session_hours)?;
    let state = AppState::new(Arc::new(PgStore::new(pool)), keys, config.page_size);

    let (addr, server) = warp::serve(api::routes(state))
        .try_bind_with_graceful_shutdown(config.bind_address, shutdown_signal())?;
    log::info!("Listening on http://{addr}");
    server.await;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
