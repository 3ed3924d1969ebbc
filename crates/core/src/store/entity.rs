use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Number of hourly buckets in the movement log (09–10 … 14–15).
pub const MOVEMENT_BUCKETS: usize = 6;

/// Local hour covered by bucket 0.
pub const FIRST_BUCKET_HOUR: u32 = 9;

/// # Summary
/// Maps a market-local hour to its movement bucket.
///
/// # Returns
/// `Some(index)` for hours 9 through 14, `None` for any other hour.
pub fn movement_bucket(hour: u32) -> Option<usize> {
    let offset = hour.checked_sub(FIRST_BUCKET_HOUR)?;
    let index = usize::try_from(offset).ok()?;
    (index < MOVEMENT_BUCKETS).then_some(index)
}

/// # Summary
/// Column header of a bucket, e.g. `9AM-10AM`, `12PM-1PM`.
pub fn bucket_label(index: usize) -> Option<String> {
    if index >= MOVEMENT_BUCKETS {
        return None;
    }
    let start = FIRST_BUCKET_HOUR + u32::try_from(index).ok()?;
    Some(format!("{}-{}", clock_label(start), clock_label(start + 1)))
}

fn clock_label(hour: u32) -> String {
    match hour {
        0 => "12AM".to_string(),
        1..=11 => format!("{}AM", hour),
        12 => "12PM".to_string(),
        _ => format!("{}PM", hour - 12),
    }
}

/// # Summary
/// One row of the price/signal log.
///
/// # Invariants
/// - `timestamp` is market-local wall time.
/// - `trade_signal` and `pivot_alert` are empty when nothing fired on that tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub trade_signal: String,
    pub pivot_alert: String,
}

/// # Summary
/// One row of the movement log: large upward moves per hourly bucket.
///
/// # Invariants
/// - Exactly one row per date.
/// - Counters only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRow {
    pub date: NaiveDate,
    pub counts: [u32; MOVEMENT_BUCKETS],
}

impl MovementRow {
    /// A fresh all-zero row.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            counts: [0; MOVEMENT_BUCKETS],
        }
    }

    pub fn count(&self, bucket: usize) -> Option<u32> {
        self.counts.get(bucket).copied()
    }
}
