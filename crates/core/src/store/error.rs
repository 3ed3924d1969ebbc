use thiserror::Error;

/// # Summary
/// Ledger failure. A write failure while the market is open is an unexpected
/// runtime fault and ends the process.
///
/// # Invariants
/// - Derived through `thiserror`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),
    /// Row not found
    #[error("Not found")]
    NotFound,
    /// Caller passed an out-of-range cell coordinate
    #[error("Invalid cell: {0}")]
    InvalidCell(String),
    /// Ledger could not be opened
    #[error("Initialization error: {0}")]
    InitError(String),
}
