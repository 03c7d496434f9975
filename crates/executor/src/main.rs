use anyhow::Context;
use dotenvy::dotenv;
use tokio::sync::watch;
use tracing::{error, info};

use common::config::Settings;
use common::logger;
use market_data::CoinMarketCapClient;
use storage::Database;
use strategy::SignalClassifier;

use crate::poll_loop::PollLoop;

mod error;
mod poll_loop;
mod report;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    info!("System starting up...");

    let started = match Settings::from_env() {
        Ok(settings) => startup(settings).await,
        Err(e) => Err(anyhow::Error::new(e).context("loading configuration")),
    };
    let (settings, db, client) = match started {
        Ok(parts) => parts,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, finishing up");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("Failed to listen for interrupt: {}", e),
        }
    });

    let mut poll_loop = PollLoop::new(client, db.clone(), settings.symbols.clone())
        .with_intervals(settings.poll_interval, settings.retry_interval)
        .with_classifier(SignalClassifier::new(settings.lookback_periods));

    poll_loop.run(shutdown_rx).await;

    db.close().await;
    Ok(())
}

async fn startup(
    settings: Settings,
) -> anyhow::Result<(Settings, Database, CoinMarketCapClient)> {
    let db = Database::connect(&settings.database_url)
        .await
        .context("initialising the quote store")?;
    let client = CoinMarketCapClient::new(&settings.base_url, &settings.api_key)
        .context("building the HTTP client")?;

    info!(
        symbols = ?settings.symbols,
        base_url = %settings.base_url,
        "Configuration loaded"
    );
    Ok((settings, db, client))
}
