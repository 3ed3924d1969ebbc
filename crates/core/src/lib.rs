//! Entities, error types and port traits shared by every tickwatch crate.
//!
//! Adapters (`tickwatch-feed`, `tickwatch-notify`, `tickwatch-store`) implement
//! the ports declared here; the engine and scheduler only ever see the traits.

pub mod common;
pub mod config;
pub mod engine;
pub mod market;
pub mod notify;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod test_utils;
