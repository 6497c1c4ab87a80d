use anyhow::Context;
use std::sync::Arc;

use orderdesk::{
    arguments::{get_config_path, patterns, print_debug_info, print_help},
    config::load_config_from_path,
    logger::{self, LogTag},
    orders::OrderStore,
    webserver::{self, state::AppState, ws::LiveUpdates},
};

/// Main entry point for orderdesk
///
/// Loads config, opens the order database, brings up the live update
/// endpoint and serves the HTTP API until Ctrl+C.
#[tokio::main]
async fn main() {
    logger::init();

    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "🚀 orderdesk starting up...");
    print_debug_info();

    if let Err(e) = run().await {
        logger::error(LogTag::System, &format!("❌ {:#}", e));
        logger::flush();
        std::process::exit(1);
    }

    logger::info(LogTag::System, "👋 orderdesk stopped");
    logger::flush();
}

async fn run() -> anyhow::Result<()> {
    let config_path = get_config_path();
    let config = load_config_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let orders = OrderStore::open(&config.database.path)
        .with_context(|| format!("Failed to open order database {}", config.database.path))?;

    // Bind the live endpoint now so a port conflict shows up at startup.
    // Failure only disables live updates.
    let live = LiveUpdates::new(config.live.clone());
    if live.acquire().await.is_none() {
        logger::warning(
            LogTag::Live,
            "⚠️ Continuing without live order updates; dashboards must refresh manually",
        );
    }

    let state = Arc::new(AppState::new(
        config.webserver.clone(),
        Arc::new(orders),
        Arc::clone(&live),
    ));

    tokio::spawn(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::info(LogTag::System, "🛑 Shutdown requested");
                webserver::shutdown();
            }
            Err(e) => logger::error(
                LogTag::System,
                &format!("Failed to listen for shutdown signal: {}", e),
            ),
        }
    });

    let served = webserver::start_server(state).await;
    live.shutdown().await;
    served.context("HTTP API failed")?;

    Ok(())
}
