//! Hand-written fakes for the market and notify ports, shared by the engine
//! and scheduler test suites.

use crate::common::Instrument;
use crate::market::entity::PivotLevels;
use crate::market::error::MarketError;
use crate::market::port::{PivotSource, PriceSource};
use crate::notify::error::NotifyError;
use crate::notify::port::AlertSink;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// # Summary
/// Price source replaying a fixed script. `None` entries and an exhausted
/// script both fail with `MarketError::NotFound`.
pub struct ScriptedPriceSource {
    script: Mutex<VecDeque<Option<f64>>>,
    calls: AtomicUsize,
}

impl ScriptedPriceSource {
    pub fn new(script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience for scripts without failures.
    pub fn prices(prices: impl IntoIterator<Item = f64>) -> Self {
        Self::new(prices.into_iter().map(Some))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    async fn fetch_price(&self, _instrument: &Instrument) -> Result<f64, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .await
            .pop_front()
            .flatten()
            .ok_or(MarketError::NotFound)
    }
}

/// # Summary
/// Pivot source answering from a queue; once the queue is drained it keeps
/// returning the last answer. Counts calls so tests can assert caching.
pub struct ScriptedPivotSource {
    answers: Mutex<VecDeque<PivotLevels>>,
    last: Mutex<PivotLevels>,
    calls: AtomicUsize,
}

impl ScriptedPivotSource {
    pub fn new(answers: impl IntoIterator<Item = PivotLevels>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            last: Mutex::new(PivotLevels::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answers with `levels`.
    pub fn fixed(levels: PivotLevels) -> Self {
        Self::new([levels])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PivotSource for ScriptedPivotSource {
    async fn fetch_pivots(&self, _instrument: &Instrument) -> Result<PivotLevels, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().await;
        if let Some(next) = self.answers.lock().await.pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

/// # Summary
/// Alert sink that records every message. With `failing()` it still records
/// but reports a delivery error, like an unreachable chat workspace.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub async fn messages(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().await.push(text.to_string());
        if self.fail {
            return Err(NotifyError::Network("sink unreachable".into()));
        }
        Ok(())
    }
}
