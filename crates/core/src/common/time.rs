use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};

/// # Summary
/// Clock abstraction so the engine and scheduler never read the system time
/// directly. Market-hours gating and hourly buckets are tested against a
/// `FakeClockProvider`.
pub trait TimeProvider: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// # Summary
/// Wall clock used in production.
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// Settable clock for tests.
///
/// # Invariants
/// - Interior `RwLock` lets a test move time while the engine holds an `Arc` to it.
/// - A poisoned lock is recovered rather than propagated; the stored value is a plain `Copy` instant.
pub struct FakeClockProvider {
    current_time: RwLock<DateTime<Utc>>,
}

impl FakeClockProvider {
    /// Creates a fake clock frozen at `initial_time`.
    pub fn new(initial_time: DateTime<Utc>) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// Jumps the clock to `new_time`.
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *time = new_time;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: chrono::Duration) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *time += delta;
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current_time
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
