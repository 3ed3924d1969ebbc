use thiserror::Error;

/// # Summary
/// Price or pivot source failure. Always transient from the engine's point of
/// view: the tick degrades and the next tick retries.
///
/// # Invariants
/// - Derived through `thiserror`.
#[derive(Error, Debug)]
pub enum MarketError {
    // transport failure or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),
    // payload did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
    // the source answered but carried no price for the instrument
    #[error("Data not found")]
    NotFound,
    #[error("Unknown error: {0}")]
    Unknown(String),
}
