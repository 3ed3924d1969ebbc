use super::entity::{MovementRow, PriceRecord};
use super::error::StoreError;
use crate::market::entity::PivotLevels;
use async_trait::async_trait;
use chrono::NaiveDate;

/// # Summary
/// The three durable logs written by the engine: price/signal log, pivot log
/// and hourly movement counts.
///
/// # Invariants
/// - Price and pivot logs are append-only.
/// - The movement log holds at most one row per date; cells are addressed by
///   `(date, bucket)` with `bucket < MOVEMENT_BUCKETS`.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Appends one price-log row.
    async fn append_price(&self, record: &PriceRecord) -> Result<(), StoreError>;

    /// # Summary
    /// Appends one pivot-log row: `date, "Daily", PP, R1, R2, R3, S1, S2, S3`.
    ///
    /// # Logic
    /// Levels missing from `levels` are stored as NULL.
    async fn append_pivots(&self, date: NaiveDate, levels: &PivotLevels) -> Result<(), StoreError>;

    /// Today's movement row, if one was created.
    async fn movement_row(&self, date: NaiveDate) -> Result<Option<MovementRow>, StoreError>;

    /// # Summary
    /// Creates an all-zero movement row for `date`.
    ///
    /// # Returns
    /// The row as stored, which is the existing one when `date` already had a row.
    async fn create_movement_row(&self, date: NaiveDate) -> Result<MovementRow, StoreError>;

    /// # Summary
    /// Overwrites a single movement cell.
    ///
    /// # Returns
    /// * `Err(StoreError::NotFound)` when `date` has no row.
    /// * `Err(StoreError::InvalidCell)` when `bucket` is out of range.
    async fn set_movement_count(
        &self,
        date: NaiveDate,
        bucket: usize,
        count: u32,
    ) -> Result<(), StoreError>;

    /// Most recent price-log rows, newest last.
    async fn recent_prices(&self, limit: usize) -> Result<Vec<PriceRecord>, StoreError>;

    /// Pivot-log rows written for `date`, oldest first.
    async fn pivots_on(&self, date: NaiveDate) -> Result<Vec<PivotLevels>, StoreError>;

    /// # Summary
    /// Point read of a single movement cell.
    ///
    /// # Returns
    /// `None` when `date` has no row yet.
    async fn movement_count(&self, date: NaiveDate, bucket: usize) -> Result<Option<u32>, StoreError> {
        match self.movement_row(date).await? {
            Some(row) => row
                .count(bucket)
                .map(Some)
                .ok_or_else(|| StoreError::InvalidCell(format!("bucket {} out of range", bucket))),
            None => Ok(None),
        }
    }
}
