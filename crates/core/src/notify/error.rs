use thiserror::Error;

/// # Summary
/// Alert delivery failure. Never fatal: callers log it and move on.
///
/// # Invariants
/// - Derived through `thiserror`.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Network or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Channel misconfigured (missing token, bad channel id)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The platform answered with an error (e.g. Slack `ok: false`)
    #[error("Platform error: {0}")]
    Platform(String),

    /// The local notifier process could not be run
    #[error("Local notifier error: {0}")]
    Local(String),
}
