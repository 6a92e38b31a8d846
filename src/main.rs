use clap::Parser;
use tracing_subscriber::EnvFilter;

use standup_web::cli::Cli;
use standup_web::{config, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up API_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = config::config().clone();
    cli.apply(&mut config);

    tracing::info!("Starting standup web in {:?} mode", config.environment);

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(api_url = %state.gateway.base_url(), "upstream API configured");

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("standup web listening on http://{}", bind_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
