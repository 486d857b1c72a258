mod api;
mod app_config;
mod cli;
mod params;
mod router;
mod state;

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use userlake_bigquery::BigQueryClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = cli::Cli::parse();
    let (config, bigquery) = app_config::load_config(&cli);
    config.log_summary();
    bigquery.log_summary();

    let warehouse = BigQueryClient::new(bigquery.clone()).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(state::AppState {
        config,
        bigquery,
        warehouse: Arc::new(warehouse),
    });
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
