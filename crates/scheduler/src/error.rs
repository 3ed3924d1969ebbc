use thiserror::Error;
use tickwatch_core::engine::error::EngineError;

/// # Summary
/// Reason the scheduler stopped other than an interrupt.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The engine hit an unexpected runtime fault
    #[error("Engine fault: {0}")]
    Engine(#[from] EngineError),
}
