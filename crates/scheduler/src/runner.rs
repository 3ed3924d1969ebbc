use crate::error::SchedulerError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tickwatch_core::common::calendar::MarketHours;
use tickwatch_core::common::time::TimeProvider;
use tickwatch_core::config::SchedulerConfig;
use tickwatch_core::engine::entity::Alert;
use tickwatch_core::notify::port::AlertSink;
use tickwatch_engine::signal::SignalEngine;
use tracing::{error, info, warn};

/// # Summary
/// Drives a [`SignalEngine`] during market hours and sleeps outside them.
///
/// # Invariants
/// - `tick` is only called while `MarketHours::is_open` holds.
/// - Exactly one of "stopped" or "fault" is announced when the loop ends.
/// - Every wait (tick, poll sleep, closed sleep) is raced against shutdown.
pub struct Scheduler {
    engine: SignalEngine,
    hours: MarketHours,
    clock: Arc<dyn TimeProvider>,
    sink: Arc<dyn AlertSink>,
    poll_interval: Duration,
    closed_recheck: Duration,
}

impl Scheduler {
    pub fn new(
        engine: SignalEngine,
        hours: MarketHours,
        clock: Arc<dyn TimeProvider>,
        sink: Arc<dyn AlertSink>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            engine,
            hours,
            clock,
            sink,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            closed_recheck: Duration::from_secs(config.closed_recheck_secs),
        }
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    /// # Summary
    /// Runs until Ctrl-C or an engine fault.
    pub async fn run(&mut self) -> Result<(), SchedulerError> {
        self.run_until(interrupted()).await
    }

    /// # Summary
    /// Main loop, ended by `shutdown` or by an engine fault.
    ///
    /// # Logic
    /// 1. Market open: announce reopening if a closure was announced, tick,
    ///    then sleep `poll_interval`.
    /// 2. Market closed: announce it, sleep `closed_recheck`, check again.
    /// 3. `shutdown` resolving at any await point: announce "stopped", return `Ok`.
    /// 4. Tick error: announce the fault, return it.
    ///
    /// # Returns
    /// * `Ok(())` - stopped by `shutdown`.
    /// * `Err(SchedulerError::Engine)` - the engine faulted.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), SchedulerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let name = self.engine.instrument().display_name.clone();
        let mut closed_announced = false;

        loop {
            let now = self.clock.now();

            if self.hours.is_open(now) {
                if closed_announced {
                    closed_announced = false;
                    self.announce(Alert::MarketOpened { name: name.clone() }).await;
                }

                let outcome = tokio::select! {
                    biased;
                    _ = &mut shutdown => None,
                    outcome = self.engine.tick() => Some(outcome),
                };
                match outcome {
                    None => break,
                    Some(Err(e)) => {
                        error!("❌ Engine fault: {}", e);
                        self.announce(Alert::Fault {
                            reason: e.to_string(),
                        })
                        .await;
                        return Err(e.into());
                    }
                    Some(Ok(_)) => {}
                }

                if sleep_or_shutdown(self.poll_interval, &mut shutdown).await {
                    break;
                }
            } else {
                closed_announced = true;
                self.announce(Alert::MarketClosed).await;
                match self.hours.next_open(now) {
                    Some(at) => info!(
                        "Market closed, next session opens {}",
                        self.hours.local(at).format("%a %Y-%m-%d %H:%M %Z")
                    ),
                    None => warn!("Market closed, next session unknown"),
                }

                if sleep_or_shutdown(self.closed_recheck, &mut shutdown).await {
                    break;
                }
            }
        }

        info!("Shutdown requested, stopping {}", name);
        self.announce(Alert::Stopped { name }).await;
        Ok(())
    }

    async fn announce(&self, alert: Alert) {
        if let Err(e) = self.sink.send(&alert.to_string()).await {
            warn!("⚠️ Alert delivery failed: {}", e);
        }
    }
}

/// Sleeps for `duration`; returns `true` if `shutdown` resolved first.
async fn sleep_or_shutdown<F>(duration: Duration, shutdown: &mut std::pin::Pin<&mut F>) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = shutdown.as_mut() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed it never resolves.
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupt received"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
