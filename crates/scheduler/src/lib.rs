//! Market-hours driven main loop around a `SignalEngine`.

pub mod error;
pub mod runner;
