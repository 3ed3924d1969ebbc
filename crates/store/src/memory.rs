use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tickwatch_core::market::entity::PivotLevels;
use tickwatch_core::store::entity::{MOVEMENT_BUCKETS, MovementRow, PriceRecord};
use tickwatch_core::store::error::StoreError;
use tickwatch_core::store::port::Ledger;
use tokio::sync::RwLock;

#[derive(Default)]
struct Logs {
    prices: Vec<PriceRecord>,
    pivots: Vec<(NaiveDate, PivotLevels)>,
    movements: BTreeMap<NaiveDate, [u32; MOVEMENT_BUCKETS]>,
}

/// # Summary
/// In-process `Ledger`. Nothing survives the process; used for dry runs
/// (`ledger.data_dir = ""`) and by the engine and scheduler tests.
///
/// Writes can be switched off with [`MemoryLedger::set_read_only`] to
/// exercise the fatal-fault path.
pub struct MemoryLedger {
    logs: RwLock<Logs>,
    read_only: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Logs::default()),
            read_only: AtomicBool::new(false),
        }
    }

    /// When `true`, every write fails with `StoreError::Database`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub async fn price_count(&self) -> usize {
        self.logs.read().await.prices.len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Database("ledger is read-only".into()));
        }
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn append_price(&self, record: &PriceRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.logs.write().await.prices.push(record.clone());
        Ok(())
    }

    async fn append_pivots(&self, date: NaiveDate, levels: &PivotLevels) -> Result<(), StoreError> {
        self.check_writable()?;
        self.logs.write().await.pivots.push((date, levels.clone()));
        Ok(())
    }

    async fn movement_row(&self, date: NaiveDate) -> Result<Option<MovementRow>, StoreError> {
        Ok(self
            .logs
            .read()
            .await
            .movements
            .get(&date)
            .map(|counts| MovementRow {
                date,
                counts: *counts,
            }))
    }

    async fn create_movement_row(&self, date: NaiveDate) -> Result<MovementRow, StoreError> {
        self.check_writable()?;
        let mut logs = self.logs.write().await;
        let counts = logs
            .movements
            .entry(date)
            .or_insert([0; MOVEMENT_BUCKETS]);
        Ok(MovementRow {
            date,
            counts: *counts,
        })
    }

    async fn set_movement_count(
        &self,
        date: NaiveDate,
        bucket: usize,
        count: u32,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut logs = self.logs.write().await;
        let counts = logs.movements.get_mut(&date).ok_or(StoreError::NotFound)?;
        let cell = counts
            .get_mut(bucket)
            .ok_or_else(|| StoreError::InvalidCell(format!("bucket {} out of range", bucket)))?;
        *cell = count;
        Ok(())
    }

    async fn recent_prices(&self, limit: usize) -> Result<Vec<PriceRecord>, StoreError> {
        let logs = self.logs.read().await;
        let skip = logs.prices.len().saturating_sub(limit);
        Ok(logs.prices[skip..].to_vec())
    }

    async fn pivots_on(&self, date: NaiveDate) -> Result<Vec<PivotLevels>, StoreError> {
        Ok(self
            .logs
            .read()
            .await
            .pivots
            .iter()
            .filter(|(d, _)| *d == date)
            .map(|(_, levels)| levels.clone())
            .collect())
    }
}
