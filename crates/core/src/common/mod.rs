use serde::{Deserialize, Serialize};

pub mod calendar;
pub mod time;

/// # Summary
/// The single instrument the bot watches.
///
/// # Invariants
/// - `symbol` is the code understood by the price source (e.g. `ICICIBANK.NS`).
/// - `display_name` is only used to render alert text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    // price source code, e.g. ICICIBANK.NS
    pub symbol: String,
    // human readable name used in alerts, e.g. "ICICI Bank"
    pub display_name: String,
    // pivot page path on the pivot source, e.g. banks-private-sector/icicibank/ICI02
    pub pivot_page: String,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            symbol: "ICICIBANK.NS".to_string(),
            display_name: "ICICI Bank".to_string(),
            pivot_page: "banks-private-sector/icicibank/ICI02".to_string(),
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.symbol)
    }
}
