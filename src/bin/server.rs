//! Planner API server binary.
//!
//! Loads configuration, opens (or creates) the database, and serves the REST
//! API until interrupted.

use studyplan::{AppState, Db, PlannerConfig, PlannerServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = PlannerConfig::load()?;
    let db_path = config.database.resolve_path();
    tracing::info!(path = %db_path.display(), "opening planner database");
    let db = Db::open(&db_path)?;

    let server = PlannerServer::start(AppState::new(db), &config.http.host, config.http.port)
        .await
        .map_err(|e| anyhow::anyhow!("failed to start planner API: {e}"))?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown();
    Ok(())
}
