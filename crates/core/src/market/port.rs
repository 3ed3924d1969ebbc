use crate::common::Instrument;
use crate::market::entity::PivotLevels;
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// Source of the latest traded price of one instrument.
///
/// # Invariants
/// - Implementations never retry internally; the caller's next tick is the retry.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// # Summary
    /// Fetches the current price.
    ///
    /// # Arguments
    /// * `instrument`: the watched instrument.
    ///
    /// # Returns
    /// The price, or a `MarketError` that callers treat as "price absent".
    async fn fetch_price(&self, instrument: &Instrument) -> Result<f64, MarketError>;
}

/// # Summary
/// Source of the daily pivot levels of one instrument.
#[async_trait]
pub trait PivotSource: Send + Sync {
    /// # Summary
    /// Fetches today's pivot levels.
    ///
    /// # Returns
    /// A complete mapping, or an empty one when the page could not be parsed.
    /// An empty mapping is a "try again later" answer, not an error.
    async fn fetch_pivots(&self, instrument: &Instrument) -> Result<PivotLevels, MarketError>;
}
