use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::path::Path;
use tickwatch_core::market::entity::{PivotLevel, PivotLevels};
use tickwatch_core::store::entity::{MOVEMENT_BUCKETS, MovementRow, PriceRecord};
use tickwatch_core::store::error::StoreError;
use tickwatch_core::store::port::Ledger;
use tracing::{debug, info};

/// Movement-log column per bucket, in bucket order.
const MOVEMENT_COLUMNS: [&str; MOVEMENT_BUCKETS] = ["h09", "h10", "h11", "h12", "h13", "h14"];

/// Pivot-log row label, the only pivot timeframe the bot records.
const PIVOT_KIND: &str = "Daily";

type MovementTuple = (NaiveDate, u32, u32, u32, u32, u32, u32);

type PivotTuple = (
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

/// # Summary
/// `Ledger` backed by a single SQLite file holding the three logs as tables:
/// `price_log`, `pivot_log` and `movement_log`.
///
/// # Invariants
/// * Schema is created when the ledger is opened.
/// * `movement_log.date` is the primary key, so a date has at most one row.
/// * All statements run on one shared `SqlitePool`.
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// # Summary
    /// Opens (or creates) the ledger file at `path`.
    ///
    /// # Logic
    /// 1. Creates the parent directory when missing.
    /// 2. Connects with `create_if_missing` and WAL journaling.
    /// 3. Runs the idempotent DDL for the three tables.
    ///
    /// # Arguments
    /// * `path` - ledger database file.
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - the ledger or `StoreError::InitError`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::InitError(e.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp DATETIME NOT NULL,
                price REAL NOT NULL,
                trade_signal TEXT NOT NULL,
                pivot_alert TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pivot_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date DATE NOT NULL,
                kind TEXT NOT NULL,
                pp REAL,
                r1 REAL,
                r2 REAL,
                r3 REAL,
                s1 REAL,
                s2 REAL,
                s3 REAL
            );

            CREATE TABLE IF NOT EXISTS movement_log (
                date DATE PRIMARY KEY,
                h09 INTEGER NOT NULL DEFAULT 0,
                h10 INTEGER NOT NULL DEFAULT 0,
                h11 INTEGER NOT NULL DEFAULT 0,
                h12 INTEGER NOT NULL DEFAULT 0,
                h13 INTEGER NOT NULL DEFAULT 0,
                h14 INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("Ledger opened at {}", path.display());
        Ok(Self { pool })
    }

    /// Closes the pool, flushing the WAL.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn append_price(&self, record: &PriceRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO price_log (timestamp, price, trade_signal, pivot_alert) VALUES (?, ?, ?, ?)",
        )
        .bind(record.timestamp)
        .bind(record.price)
        .bind(&record.trade_signal)
        .bind(&record.pivot_alert)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// # Summary
    /// Appends one `Daily` pivot row.
    ///
    /// # Logic
    /// Binds the seven levels in column order; absent levels become NULL.
    async fn append_pivots(&self, date: NaiveDate, levels: &PivotLevels) -> Result<(), StoreError> {
        let mut query = sqlx::query(
            r#"
            INSERT INTO pivot_log (date, kind, pp, r1, r2, r3, s1, s2, s3)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(date)
        .bind(PIVOT_KIND);
        for level in PivotLevel::ALL {
            query = query.bind(levels.get(level));
        }
        query.execute(&self.pool).await.map_err(db_err)?;
        debug!("Pivot row appended for {}", date);
        Ok(())
    }

    async fn movement_row(&self, date: NaiveDate) -> Result<Option<MovementRow>, StoreError> {
        let row = sqlx::query_as::<_, MovementTuple>(
            "SELECT date, h09, h10, h11, h12, h13, h14 FROM movement_log WHERE date = ?",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| MovementRow {
            date: r.0,
            counts: [r.1, r.2, r.3, r.4, r.5, r.6],
        }))
    }

    /// # Summary
    /// Inserts an all-zero row for `date` unless one exists.
    ///
    /// # Logic
    /// 1. `INSERT OR IGNORE` keeps an existing row untouched.
    /// 2. Reads the row back so the caller sees the stored counters.
    async fn create_movement_row(&self, date: NaiveDate) -> Result<MovementRow, StoreError> {
        sqlx::query("INSERT OR IGNORE INTO movement_log (date) VALUES (?)")
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        self.movement_row(date).await?.ok_or(StoreError::NotFound)
    }

    async fn set_movement_count(
        &self,
        date: NaiveDate,
        bucket: usize,
        count: u32,
    ) -> Result<(), StoreError> {
        let column = MOVEMENT_COLUMNS
            .get(bucket)
            .ok_or_else(|| StoreError::InvalidCell(format!("bucket {} out of range", bucket)))?;

        // column names come from MOVEMENT_COLUMNS only
        let sql = format!("UPDATE movement_log SET {} = ? WHERE date = ?", column);
        let result = sqlx::query(&sql)
            .bind(count)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn recent_prices(&self, limit: usize) -> Result<Vec<PriceRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = sqlx::query_as::<_, (NaiveDateTime, f64, String, String)>(
            r#"
            SELECT timestamp, price, trade_signal, pivot_alert
            FROM price_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.reverse();

        Ok(rows
            .into_iter()
            .map(|r| PriceRecord {
                timestamp: r.0,
                price: r.1,
                trade_signal: r.2,
                pivot_alert: r.3,
            })
            .collect())
    }

    async fn pivots_on(&self, date: NaiveDate) -> Result<Vec<PivotLevels>, StoreError> {
        let rows = sqlx::query_as::<_, PivotTuple>(
            r#"
            SELECT pp, r1, r2, r3, s1, s2, s3
            FROM pivot_log
            WHERE date = ?
            ORDER BY id ASC
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let values = [r.0, r.1, r.2, r.3, r.4, r.5, r.6];
                PivotLevel::ALL
                    .into_iter()
                    .zip(values)
                    .filter_map(|(level, value)| value.map(|v| (level, v)))
                    .collect()
            })
            .collect())
    }
}
