use crate::market::entity::PivotLevel;
use serde::{Deserialize, Serialize};

/// # Summary
/// Single-position trade state of the watched instrument.
///
/// # Invariants
/// - An entry price exists if and only if the engine is in a trade; the enum
///   makes any other combination unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum TradeState {
    #[default]
    Flat,
    Long { entry: f64 },
}

impl TradeState {
    pub fn in_trade(&self) -> bool {
        matches!(self, TradeState::Long { .. })
    }

    pub fn trade_price(&self) -> Option<f64> {
        match self {
            TradeState::Flat => None,
            TradeState::Long { entry } => Some(*entry),
        }
    }
}

/// Direction of a price change between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increased,
    Decreased,
}

/// # Summary
/// Every message the bot can send to the alert sink.
///
/// # Invariants
/// - `Display` renders the exact text delivered to the user.
/// - Instrument-specific variants carry the display name so rendering needs no context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alert {
    // price moved since the previous tick
    Movement {
        name: String,
        direction: Direction,
        price: f64,
        previous: f64,
    },
    // rise while flat, sent right before the entry
    Rising { name: String },
    // flat -> long
    Entry { name: String, price: f64 },
    // long -> flat above the profit target
    ProfitExit {
        name: String,
        price: f64,
        entry: f64,
    },
    // long -> flat below the stop-loss
    StopLoss {
        name: String,
        price: f64,
        entry: f64,
    },
    PivotProximity {
        name: String,
        level: PivotLevel,
        value: f64,
        price: f64,
    },
    HourlySummary {
        name: String,
        hour: u32,
        movements: u32,
    },
    RiskDisclaimer,
    Started { name: String },
    StartFailed { reason: String },
    MarketClosed,
    MarketOpened { name: String },
    Stopped { name: String },
    Fault { reason: String },
}

impl Alert {
    /// Whether the alert belongs in the price log's trade-signal column.
    pub fn is_trade_signal(&self) -> bool {
        matches!(
            self,
            Alert::Entry { .. } | Alert::ProfitExit { .. } | Alert::StopLoss { .. }
        )
    }

    /// Whether the alert belongs in the price log's pivot-alert column.
    pub fn is_pivot_alert(&self) -> bool {
        matches!(self, Alert::PivotProximity { .. })
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::Movement {
                name,
                direction,
                price,
                previous,
            } => {
                let arrow = match direction {
                    Direction::Increased => "⬆️ Increased",
                    Direction::Decreased => "⬇️ Decreased",
                };
                write!(
                    f,
                    "⚡ *{} {}!* New Price: ₹{} (Prev: ₹{})",
                    name, arrow, price, previous
                )
            }
            Alert::Rising { name } => {
                write!(f, "💹 {} is rising, checking for buy opportunity...", name)
            }
            Alert::Entry { name, price } => write!(f, "✅ {} stock bought at ₹{}", name, price),
            Alert::ProfitExit { name, price, entry } => write!(
                f,
                "🎯 {} sold at ₹{} (Profit: ₹{:.2})",
                name,
                price,
                price - entry
            ),
            Alert::StopLoss { name, price, entry } => write!(
                f,
                "🚨 {} stoploss hit at ₹{} (entry ₹{}), exiting trade...",
                name, price, entry
            ),
            Alert::PivotProximity {
                name,
                level,
                value,
                price,
            } => write!(
                f,
                "🎯 {} Price near {}: ₹{} (Current: ₹{})",
                name, level, value, price
            ),
            Alert::HourlySummary {
                name,
                hour,
                movements,
            } => write!(
                f,
                "⏳ Hourly Update: {} had {} significant price movements from {}:00 to {}:00.",
                name,
                movements,
                hour,
                hour + 1
            ),
            Alert::RiskDisclaimer => f.write_str(
                "⚠️ Gentle Reminder: The share market is risky. Be careful when investing!",
            ),
            Alert::Started { name } => {
                write!(f, "🚀 *Stock Bot Started!* Tracking {} price changes...", name)
            }
            Alert::StartFailed { reason } => {
                write!(f, "❌ *Stock Bot Failed to Start!* {}", reason)
            }
            Alert::MarketClosed => f.write_str("⏳ Market Closed....Waiting for next trading day...."),
            Alert::MarketOpened { name } => {
                write!(f, "🚀 *Market Opened!* Resuming {} tracking....", name)
            }
            Alert::Stopped { name } => {
                write!(f, "🛑 *Stock Bot Stopped!* No longer tracking {}.", name)
            }
            Alert::Fault { reason } => write!(f, "❌ *Stock Bot Error!* {}", reason),
        }
    }
}

/// # Summary
/// Outcome of one engine tick.
///
/// # Invariants
/// - `alerts` is in emission order.
/// - `price` is `None` exactly when the price fetch failed; every other field is then empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickResult {
    pub price: Option<f64>,
    pub alerts: Vec<Alert>,
    pub price_logged: bool,
    // new bucket value when a large movement was tallied
    pub movement_count: Option<u32>,
}

impl TickResult {
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_state_invariant_by_construction() {
        let flat = TradeState::Flat;
        assert!(!flat.in_trade());
        assert_eq!(flat.trade_price(), None);

        let long = TradeState::Long { entry: 1004.0 };
        assert!(long.in_trade());
        assert_eq!(long.trade_price(), Some(1004.0));
    }

    #[test]
    fn test_alert_text() {
        let alert = Alert::Movement {
            name: "ICICI Bank".into(),
            direction: Direction::Increased,
            price: 1004.0,
            previous: 1000.0,
        };
        assert_eq!(
            alert.to_string(),
            "⚡ *ICICI Bank ⬆️ Increased!* New Price: ₹1004 (Prev: ₹1000)"
        );

        let rising = Alert::Rising {
            name: "ICICI Bank".into(),
        };
        assert_eq!(
            rising.to_string(),
            "💹 ICICI Bank is rising, checking for buy opportunity..."
        );

        let summary = Alert::HourlySummary {
            name: "ICICI Bank".into(),
            hour: 10,
            movements: 3,
        };
        assert_eq!(
            summary.to_string(),
            "⏳ Hourly Update: ICICI Bank had 3 significant price movements from 10:00 to 11:00."
        );
    }

    #[test]
    fn test_alert_columns() {
        assert!(Alert::Entry { name: "X".into(), price: 1.0 }.is_trade_signal());
        assert!(!Alert::RiskDisclaimer.is_trade_signal());
        assert!(!Alert::Rising { name: "X".into() }.is_trade_signal());
        assert!(Alert::PivotProximity {
            name: "X".into(),
            level: PivotLevel::Pp,
            value: 1.0,
            price: 1.0
        }
        .is_pivot_alert());
    }
}
