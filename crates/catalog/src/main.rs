//! Washu sake catalog server.
//!
//! `washu serve` (the default) runs the HTTP API. `washu migrate` applies
//! the schema and exits. `washu seed --dir <path>` loads a directory of CSV
//! seed files idempotently; `--file <path>` loads a JSON seed document.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use washu_catalog::catalog::{SeedData, load_seed};
use washu_catalog::{AppState, Config, db, routes};

/// Read-only sake catalog API.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve,

    /// Apply database migrations and exit.
    Migrate,

    /// Load seed data. Existing rows are left untouched.
    Seed {
        /// Directory with breweries.csv, taste_tags.csv, sake.csv and sake_taste_map.csv.
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        dir: Option<PathBuf>,

        /// JSON document with breweries, taste_tags, sake and sake_taste_map arrays.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(&config).await,
        Command::Seed { dir, file } => {
            let data = match (dir, file) {
                (Some(dir), _) => SeedData::from_csv_dir(&dir)?,
                (None, Some(file)) => SeedData::from_path(&file)?,
                (None, None) => bail!("either --dir or --file is required"),
            };
            seed(&config, &data).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, "Starting Washu catalog");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let app = routes::router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(routes::cors::cors_layer(&config)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn migrate(config: &Config) -> Result<()> {
    let pool = db::create_pool(config).await?;
    db::run_migrations(&pool).await?;
    info!("Migrations applied");
    Ok(())
}

async fn seed(config: &Config, data: &SeedData) -> Result<()> {
    let pool = db::create_pool(config).await?;
    db::run_migrations(&pool).await?;

    let report = load_seed(&pool, data).await?;
    info!(?report, "Seed complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
