use async_trait::async_trait;
use std::sync::Arc;
use tickwatch_core::notify::error::NotifyError;
use tickwatch_core::notify::port::{AlertSink, Notifier};
use tracing::{error, info};

/// # Summary
/// `AlertSink` fanning every message out to all configured channels.
///
/// # Invariants
/// - Channels are tried in registration order, each exactly once.
/// - A failing channel does not stop delivery to the others.
pub struct AlertDispatcher {
    // title for channels that show one (desktop popup)
    subject: String,
    channels: Vec<Arc<dyn Notifier>>,
}

impl AlertDispatcher {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            channels: Vec::new(),
        }
    }

    /// Adds a delivery channel.
    pub fn register(&mut self, channel: Arc<dyn Notifier>) {
        self.channels.push(channel);
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_string()).collect()
    }
}

#[async_trait]
impl AlertSink for AlertDispatcher {
    /// # Summary
    /// Delivers `text` to every channel.
    ///
    /// # Logic
    /// 1. Calls each channel in order, logging failures at error level.
    /// 2. Logs the alert once at info level, even with no channel configured.
    ///
    /// # Returns
    /// The first channel error, after all channels were attempted.
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let mut first_error = None;
        for channel in &self.channels {
            if let Err(e) = channel.notify(&self.subject, text).await {
                error!("❌ {} delivery failed: {}", channel.name(), e);
                first_error.get_or_insert(e);
            }
        }

        info!("📢 Alert: {}", text);
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
