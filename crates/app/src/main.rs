mod logging;
mod settings;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tickwatch_core::common::calendar::MarketHours;
use tickwatch_core::common::time::{RealTimeProvider, TimeProvider};
use tickwatch_core::config::{AppConfig, LoggingConfig, NotifyConfig};
use tickwatch_core::engine::entity::Alert;
use tickwatch_core::notify::port::AlertSink;
use tickwatch_core::store::port::Ledger;
use tickwatch_engine::signal::{EnginePorts, SignalEngine};
use tickwatch_feed::moneycontrol::MoneycontrolProvider;
use tickwatch_feed::yahoo::YahooProvider;
use tickwatch_notify::desktop::DesktopNotifier;
use tickwatch_notify::dispatch::AlertDispatcher;
use tickwatch_notify::slack::SlackNotifier;
use tickwatch_scheduler::runner::Scheduler;
use tickwatch_store::memory::MemoryLedger;
use tickwatch_store::sqlite::SqliteLedger;
use tracing::{debug, error, info, warn};

/// # Summary
/// Application entry point, a pure dependency-injection container.
///
/// # Logic
/// 1. Loads `.env`, the configuration and the logging stack.
/// 2. Builds the alert channels, feeds, ledger, engine and scheduler.
/// 3. Announces the start and runs the scheduler until Ctrl-C or a fault.
///
/// Returning `Err` makes the process exit with status 1.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let dotenv = dotenvy::dotenv();

    let cfg = match settings::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            let _guard = logging::init(&LoggingConfig::default());
            install_crypto();
            error!("Configuration error: {}", e);
            let sink = build_sink(&NotifyConfig::default());
            announce(
                &sink,
                Alert::StartFailed {
                    reason: e.to_string(),
                },
            )
            .await;
            return Err(e.into());
        }
    };

    let _guard = logging::init(&cfg.logging);
    if let Err(e) = dotenv {
        debug!("No .env loaded: {}", e);
    }
    install_crypto();
    info!("tickwatch starting for {}", cfg.instrument);

    let sink = build_sink(&cfg.notify);

    let (mut scheduler, sqlite) = match wire(&cfg, sink.clone()).await {
        Ok(wired) => wired,
        Err(e) => {
            error!("Startup failed: {}", e);
            announce(
                &sink,
                Alert::StartFailed {
                    reason: e.to_string(),
                },
            )
            .await;
            return Err(e);
        }
    };

    announce(
        &sink,
        Alert::Started {
            name: cfg.instrument.display_name.clone(),
        },
    )
    .await;

    let outcome = scheduler.run().await;

    if let Some(ledger) = sqlite {
        ledger.close().await;
    }

    match outcome {
        Ok(()) => {
            info!("tickwatch stopped");
            Ok(())
        }
        Err(e) => {
            log_chain(&e);
            Err(e.into())
        }
    }
}

/// rustls is built without a default provider; ring is installed once per process.
fn install_crypto() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// # Summary
/// Builds the alert fan-out from the `[notify]` section.
///
/// # Logic
/// 1. Slack when both the token and channel env vars are set; otherwise a warning.
/// 2. Desktop popups when `notify.desktop` is on.
fn build_sink(cfg: &NotifyConfig) -> Arc<dyn AlertSink> {
    let mut dispatcher = AlertDispatcher::new(cfg.desktop_title.clone());

    match (
        std::env::var(&cfg.slack_token_env),
        std::env::var(&cfg.slack_channel_env),
    ) {
        (Ok(token), Ok(channel)) => {
            match SlackNotifier::new(token, channel, &cfg.slack_api_url) {
                Ok(slack) => dispatcher.register(Arc::new(slack)),
                Err(e) => warn!("⚠️ Slack disabled: {}", e),
            }
        }
        _ => warn!(
            "⚠️ {} or {} not set, Slack notifications disabled",
            cfg.slack_token_env, cfg.slack_channel_env
        ),
    }

    if cfg.desktop {
        dispatcher.register(Arc::new(DesktopNotifier::new(cfg.desktop_timeout_secs)));
    }

    info!("Alert channels: {:?}", dispatcher.channel_names());
    Arc::new(dispatcher)
}

/// # Summary
/// Wires the engine and scheduler.
///
/// # Returns
/// The scheduler and, when the durable ledger is used, a handle to close it.
async fn wire(
    cfg: &AppConfig,
    sink: Arc<dyn AlertSink>,
) -> Result<(Scheduler, Option<Arc<SqliteLedger>>), Box<dyn Error>> {
    let hours = MarketHours::from_config(&cfg.market)?;
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);

    let prices = Arc::new(YahooProvider::new(&cfg.feed)?);
    let pivots = Arc::new(MoneycontrolProvider::new(&cfg.feed)?);

    let (ledger, sqlite): (Arc<dyn Ledger>, Option<Arc<SqliteLedger>>) =
        if cfg.ledger.data_dir.trim().is_empty() {
            warn!("⚠️ ledger.data_dir is empty, using an in-memory ledger");
            (Arc::new(MemoryLedger::new()), None)
        } else {
            let path = Path::new(&cfg.ledger.data_dir).join(&cfg.ledger.file_name);
            let sqlite = Arc::new(SqliteLedger::open(&path).await?);
            info!("Ledger at {}", path.display());
            (sqlite.clone(), Some(sqlite))
        };

    let ports = EnginePorts {
        prices,
        pivots,
        sink: sink.clone(),
        ledger,
    };
    let engine = SignalEngine::new(
        cfg.instrument.clone(),
        cfg.engine.clone(),
        hours,
        ports,
        clock.clone(),
    );
    let scheduler = Scheduler::new(engine, hours, clock, sink, &cfg.scheduler);
    Ok((scheduler, sqlite))
}

async fn announce(sink: &Arc<dyn AlertSink>, alert: Alert) {
    if let Err(e) = sink.send(&alert.to_string()).await {
        warn!("⚠️ Alert delivery failed: {}", e);
    }
}

fn log_chain(err: &dyn Error) {
    error!("❌ tickwatch stopped on fault: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        error!("   caused by: {}", cause);
        source = cause.source();
    }
}
