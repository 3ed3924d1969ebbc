use crate::trade::{self, Thresholds, Transition};
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use std::sync::Arc;
use tickwatch_core::common::Instrument;
use tickwatch_core::common::calendar::MarketHours;
use tickwatch_core::common::time::TimeProvider;
use tickwatch_core::config::{DisclaimerPolicy, EngineConfig, PivotRefresh};
use tickwatch_core::engine::entity::{Alert, Direction, TickResult, TradeState};
use tickwatch_core::engine::error::EngineError;
use tickwatch_core::market::entity::{PivotLevels, paise};
use tickwatch_core::market::port::{PivotSource, PriceSource};
use tickwatch_core::notify::port::AlertSink;
use tickwatch_core::store::entity::{PriceRecord, bucket_label, movement_bucket};
use tickwatch_core::store::port::Ledger;
use tracing::{debug, info, warn};

/// Hour (market local) from which no hourly summary is sent any more.
const LAST_SUMMARY_HOUR: u32 = 15;

/// The external collaborators a [`SignalEngine`] talks to.
#[derive(Clone)]
pub struct EnginePorts {
    pub prices: Arc<dyn PriceSource>,
    pub pivots: Arc<dyn PivotSource>,
    pub sink: Arc<dyn AlertSink>,
    pub ledger: Arc<dyn Ledger>,
}

/// # Summary
/// Derives trading and alert signals for one instrument from successive
/// price samples.
///
/// # Invariants
/// - All mutable state lives here and changes only inside [`SignalEngine::tick`].
/// - Every alert is delivered through the sink in production order and also
///   returned in the tick result; delivery failures never fail a tick.
/// - Ledger failures always fail the tick.
pub struct SignalEngine {
    instrument: Instrument,
    config: EngineConfig,
    hours: MarketHours,
    clock: Arc<dyn TimeProvider>,
    ports: EnginePorts,
    trade: TradeState,
    last_price: Option<f64>,
    // levels together with the market-local date they were fetched for
    pivots: Option<(NaiveDate, PivotLevels)>,
    last_summary: Option<(NaiveDate, u32)>,
    last_disclaimer: Option<DateTime<Utc>>,
}

impl SignalEngine {
    /// # Summary
    /// Creates an engine in the initial state: flat, no price seen, no pivots.
    ///
    /// # Arguments
    /// * `instrument` - the watched instrument.
    /// * `config` - thresholds and refresh policies.
    /// * `hours` - market session, used for local dates and hour buckets.
    /// * `ports` - price/pivot sources, alert sink and ledger.
    /// * `clock` - time source.
    pub fn new(
        instrument: Instrument,
        config: EngineConfig,
        hours: MarketHours,
        ports: EnginePorts,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            instrument,
            config,
            hours,
            clock,
            ports,
            trade: TradeState::Flat,
            last_price: None,
            pivots: None,
            last_summary: None,
            last_disclaimer: None,
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn trade_state(&self) -> TradeState {
        self.trade
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    /// Pivot levels currently cached, if any.
    pub fn pivot_levels(&self) -> Option<&PivotLevels> {
        self.pivots.as_ref().map(|(_, levels)| levels)
    }

    /// # Summary
    /// Runs one polling step. Must only be called while the market is open.
    ///
    /// # Logic
    /// 1. Fetches the price; a failed fetch ends the tick with an empty result.
    /// 2. The very first sample only seeds the last observed price.
    /// 3. On a price change: movement alert, trade transitions, pivot
    ///    proximity, price-log row and, for rises of at least the movement
    ///    threshold, a tally increment in the current hour bucket.
    /// 4. Stores the sample and attempts the hourly summary.
    /// 5. Sends the risk disclaimer on a change, per `DisclaimerPolicy`.
    ///
    /// # Returns
    /// * `Ok(TickResult)` - what happened, alerts in emission order.
    /// * `Err(EngineError::Store)` - a ledger read or write failed.
    pub async fn tick(&mut self) -> Result<TickResult, EngineError> {
        let now = self.clock.now();
        let local = self.hours.local(now);
        let today = local.date_naive();
        let hour = local.hour();
        let mut result = TickResult::default();

        let price = match self.ports.prices.fetch_price(&self.instrument).await {
            Ok(price) => price,
            Err(e) => {
                warn!("⚠️ Price fetch failed for {}: {}", self.instrument, e);
                return Ok(result);
            }
        };
        result.price = Some(price);

        let changed_from = match self.last_price {
            None => {
                info!("First price for {}: ₹{}", self.instrument, price);
                None
            }
            Some(previous) if paise(previous) != paise(price) => Some(previous),
            Some(_) => {
                debug!("{} unchanged at ₹{}", self.instrument, price);
                None
            }
        };

        if let Some(previous) = changed_from {
            self.on_change(&mut result, today, hour, local.naive_local(), previous, price)
                .await?;
        }

        self.last_price = Some(price);
        self.hourly_summary(&mut result, today, hour).await?;

        if changed_from.is_some() && self.disclaimer_due(now) {
            self.last_disclaimer = Some(now);
            self.emit(&mut result, Alert::RiskDisclaimer).await;
        }

        Ok(result)
    }

    /// # Summary
    /// Handles a sample that differs from the previous one.
    ///
    /// # Logic
    /// 1. Movement alert with both prices.
    /// 2. Trade state machine, one alert per transition; an entry is preceded
    ///    by the rising notice.
    /// 3. Pivot proximity against today's levels (fetching them if needed).
    /// 4. Price-log row whose text columns join this tick's trade and pivot alerts.
    /// 5. Tally increment when `price - previous >= movement_threshold`, in whole paise.
    async fn on_change(
        &mut self,
        result: &mut TickResult,
        today: NaiveDate,
        hour: u32,
        timestamp: chrono::NaiveDateTime,
        previous: f64,
        price: f64,
    ) -> Result<(), EngineError> {
        let name = self.instrument.display_name.clone();
        let direction = if paise(price) > paise(previous) {
            Direction::Increased
        } else {
            Direction::Decreased
        };
        self.emit(
            result,
            Alert::Movement {
                name: name.clone(),
                direction,
                price,
                previous,
            },
        )
        .await;

        let thresholds = Thresholds {
            profit: self.config.profit_threshold,
            stoploss: self.config.stoploss_threshold,
        };
        for transition in trade::advance(&mut self.trade, previous, price, thresholds) {
            let alert = match transition {
                Transition::Entered { price } => {
                    self.emit(result, Alert::Rising { name: name.clone() }).await;
                    Alert::Entry {
                        name: name.clone(),
                        price,
                    }
                }
                Transition::TookProfit { entry, price } => Alert::ProfitExit {
                    name: name.clone(),
                    price,
                    entry,
                },
                Transition::StoppedOut { entry, price } => Alert::StopLoss {
                    name: name.clone(),
                    price,
                    entry,
                },
            };
            info!("Trade: {:?} -> {:?}", transition, self.trade);
            self.emit(result, alert).await;
        }

        self.refresh_pivots(today).await?;
        let near = self
            .current_pivots(today)
            .map(|levels| levels.near(price, self.config.pivot_tolerance))
            .unwrap_or_default();
        for (level, value) in near {
            self.emit(
                result,
                Alert::PivotProximity {
                    name: name.clone(),
                    level,
                    value,
                    price,
                },
            )
            .await;
        }

        let record = PriceRecord {
            timestamp,
            price,
            trade_signal: join_alerts(&result.alerts, Alert::is_trade_signal),
            pivot_alert: join_alerts(&result.alerts, Alert::is_pivot_alert),
        };
        self.ports.ledger.append_price(&record).await?;
        result.price_logged = true;

        if paise(price) - paise(previous) >= paise(self.config.movement_threshold) {
            result.movement_count = self.tally(today, hour).await?;
        }

        Ok(())
    }

    /// # Summary
    /// Fetches pivot levels when none are cached for `today`.
    ///
    /// # Logic
    /// A failed or empty fetch leaves the cache untouched and is retried on the
    /// next tick. A successful one is appended to the pivot log.
    async fn refresh_pivots(&mut self, today: NaiveDate) -> Result<(), EngineError> {
        if self.current_pivots(today).is_some() {
            return Ok(());
        }

        match self.ports.pivots.fetch_pivots(&self.instrument).await {
            Ok(levels) if !levels.is_empty() => {
                self.ports.ledger.append_pivots(today, &levels).await?;
                info!("📊 Pivot levels for {} on {} stored", self.instrument, today);
                self.pivots = Some((today, levels));
            }
            Ok(_) => warn!("⚠️ No pivot levels for {}, retrying next tick", self.instrument),
            Err(e) => warn!("⚠️ Pivot fetch failed for {}: {}", self.instrument, e),
        }
        Ok(())
    }

    fn current_pivots(&self, today: NaiveDate) -> Option<&PivotLevels> {
        match (&self.pivots, self.config.pivot_refresh) {
            (Some((_, levels)), PivotRefresh::Once) => Some(levels),
            (Some((date, levels)), PivotRefresh::Daily) if *date == today => Some(levels),
            _ => None,
        }
    }

    /// # Summary
    /// Adds one large movement to the bucket of `hour`.
    ///
    /// # Returns
    /// The new bucket value, or `None` when `hour` has no bucket.
    async fn tally(&self, today: NaiveDate, hour: u32) -> Result<Option<u32>, EngineError> {
        let Some(bucket) = movement_bucket(hour) else {
            warn!("⚠️ Movement at {}:00 is outside the tracked hours, not tallied", hour);
            return Ok(None);
        };

        let ledger = &self.ports.ledger;
        let row = match ledger.movement_row(today).await? {
            Some(row) => row,
            None => ledger.create_movement_row(today).await?,
        };
        let count = row.count(bucket).unwrap_or(0) + 1;
        ledger.set_movement_count(today, bucket, count).await?;
        debug!(
            "Movement tally {} {} = {}",
            today,
            bucket_label(bucket).unwrap_or_default(),
            count
        );
        Ok(Some(count))
    }

    /// # Summary
    /// Sends the movement count of the running hour, once per hour.
    ///
    /// # Logic
    /// Skipped when the hour is past the last bucket, was already summarised,
    /// or today has no tally row yet (the hour is then not marked).
    async fn hourly_summary(
        &mut self,
        result: &mut TickResult,
        today: NaiveDate,
        hour: u32,
    ) -> Result<(), EngineError> {
        if hour >= LAST_SUMMARY_HOUR || self.last_summary == Some((today, hour)) {
            return Ok(());
        }
        let Some(bucket) = movement_bucket(hour) else {
            return Ok(());
        };
        let Some(row) = self.ports.ledger.movement_row(today).await? else {
            return Ok(());
        };

        let movements = row.count(bucket).unwrap_or(0);
        self.last_summary = Some((today, hour));
        self.emit(
            result,
            Alert::HourlySummary {
                name: self.instrument.display_name.clone(),
                hour,
                movements,
            },
        )
        .await;
        Ok(())
    }

    fn disclaimer_due(&self, now: DateTime<Utc>) -> bool {
        match self.config.disclaimer {
            DisclaimerPolicy::EveryChange => true,
            DisclaimerPolicy::Off => false,
            DisclaimerPolicy::Interval => {
                let interval = i64::try_from(self.config.disclaimer_interval_secs).unwrap_or(i64::MAX);
                self.last_disclaimer
                    .is_none_or(|last| (now - last).num_seconds() >= interval)
            }
        }
    }

    /// Delivers `alert` and appends it to the result; delivery errors are logged only.
    async fn emit(&self, result: &mut TickResult, alert: Alert) {
        let text = alert.to_string();
        if let Err(e) = self.ports.sink.send(&text).await {
            warn!("⚠️ Alert delivery failed: {}", e);
        }
        result.alerts.push(alert);
    }
}

fn join_alerts(alerts: &[Alert], keep: fn(&Alert) -> bool) -> String {
    alerts
        .iter()
        .filter(|a| keep(a))
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
