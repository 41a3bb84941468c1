mod api;
mod config;
mod entry;
mod errors;
mod models;
mod numeric;
mod orderbook;
mod session;
mod submission;
mod telemetry;
mod venue;

use api::ApiServer;
use config::Config;
use session::SessionStore;
use std::sync::Arc;
use venue::Venue;
use venue::http::HttpVenue;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing("info", config.json_logs);

    let venue: Arc<dyn Venue> = Arc::new(HttpVenue::new(config.api_base.clone()));
    let store = SessionStore::new();

    tracing::info!(
        "Desk starting: assets: {:?}, {} venue at {}, polling every {:?}",
        config.assets.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
        venue.name(),
        config.api_base.origin(),
        config.poll_interval
    );

    let server = ApiServer::new(store, venue, config);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {}
    }

    tracing::info!("Shutting down...");
    Ok(())
}
