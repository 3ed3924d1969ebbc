use crate::store::error::StoreError;
use thiserror::Error;

/// # Summary
/// Engine failure that must not be swallowed.
///
/// # Invariants
/// - Fetch and delivery failures never surface here; they degrade the tick instead.
/// - Anything returned here is an unexpected runtime fault for the scheduler.
#[derive(Error, Debug)]
pub enum EngineError {
    // ledger read/write failed
    #[error("Ledger error: {0}")]
    Store(#[from] StoreError),
}
