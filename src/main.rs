use anyhow::Context;
use fxtrader::api::{PaperBroker, QuoteBoard, SyntheticFeed, SyntheticHistory};
use fxtrader::config::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use fxtrader::{SessionConfig, SessionManager};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

const PAPER_SEED: u64 = 7;
const PAPER_START_PRICE: f64 = 1.1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    tracing::info!("🚀 FX trader starting (paper mode)");

    let config_path = config_path();
    let config = SessionConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    tracing::info!("\n📊 Configuration:");
    tracing::info!("  Instrument: {}", config.instrument);
    tracing::info!("  Bar length: {}", config.bar_length);
    tracing::info!("  Units: {}", config.units);
    tracing::info!("  Duration: {} min", config.duration_minutes);
    tracing::info!(
        "  Trading hours: {}-{} {}",
        config.trading_hours.0,
        config.trading_hours.1,
        config.trading_timezone
    );
    tracing::info!("  Strategy: {:?}", config.strategy);

    // Paper collaborators share one quote board so fills price off the feed
    let quotes = QuoteBoard::new();
    let feed = Arc::new(SyntheticFeed::new(quotes.clone(), PAPER_SEED).with_start_price(PAPER_START_PRICE));
    let history = Arc::new(SyntheticHistory::new(PAPER_SEED).with_start_price(PAPER_START_PRICE));
    let broker = Arc::new(PaperBroker::new(quotes));

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut session = SessionManager::new(&config, feed, history, broker)?.with_shutdown(stop_rx);

    tracing::info!("\nPress Ctrl+C to stop...\n");

    let run = session.run();
    tokio::pin!(run);

    let result = tokio::select! {
        result = &mut run => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("\n⚠️  Received Ctrl+C, flattening and shutting down...");
            stop_tx.send(true).ok();
            run.await
        }
    };

    match result {
        Ok(report) => {
            tracing::info!(
                "👋 Session ended: {} | fills: {} | cum P&L: {}",
                report.cause,
                report.fills.len(),
                report.cumulative_pl
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Session failed: {}", e);
            Err(e.into())
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fxtrader=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn config_path() -> PathBuf {
    std::env::var(format!("{ENV_PREFIX}_CONFIG"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
}
