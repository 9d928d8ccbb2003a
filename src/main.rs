use clap::Parser;
use mailpurge::cli::Cli;
use mailpurge::config::AppConfig;
use mailpurge::server::run_server;
use mailpurge::state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli).await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            eprintln!("Please set GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REDIRECT_URI, or provide a client_secret.json. Run `mailpurge --help` for details.");
            return Err(e.into());
        }
    };
    tracing::info!(
        list_cap = config.list_cap,
        concurrency = config.concurrency,
        delete_mode = ?config.delete_mode,
        "configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config, reqwest::Client::new())?);
    run_server(config.listen_addr, state, &config.allowed_origins).await?;
    Ok(())
}
