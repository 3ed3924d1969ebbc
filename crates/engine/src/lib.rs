//! Signal derivation for a single watched instrument.
//!
//! `trade` holds the pure single-position state machine; `signal` drives it
//! from live prices and talks to the feed, ledger and alert ports.

pub mod signal;
pub mod trade;
