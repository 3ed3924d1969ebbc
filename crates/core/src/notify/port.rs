use crate::notify::error::NotifyError;
use async_trait::async_trait;

/// # Summary
/// One delivery channel (chat workspace, desktop popup, ...).
///
/// # Invariants
/// - Implementations are `Send + Sync`.
/// - A failed delivery is reported, never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name used in logs, e.g. `slack`.
    fn name(&self) -> &str;

    /// # Summary
    /// Delivers a message with a subject line and a body.
    ///
    /// # Logic
    /// 1. Format the message as the target platform expects.
    /// 2. Send it over the channel's transport.
    ///
    /// # Returns
    /// * `Ok(())` once the platform accepted the message.
    /// * `Err(NotifyError)` otherwise.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError>;
}

/// # Summary
/// Where the engine and scheduler send human-readable alerts.
///
/// # Invariants
/// - `send` attempts every underlying channel even if an earlier one failed.
/// - An `Err` is informational: callers log it and continue.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Delivers `text` to every configured channel.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
