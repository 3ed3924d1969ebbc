use async_trait::async_trait;
use tickwatch_core::notify::error::NotifyError;
use tickwatch_core::notify::port::Notifier;
use tokio::process::Command;

/// # Summary
/// Local desktop popup through the freedesktop `notify-send` command.
///
/// # Invariants
/// - The popup expires after `timeout_ms`.
/// - A missing binary or a non-zero exit is a `NotifyError::Local`.
pub struct DesktopNotifier {
    program: String,
    timeout_ms: u64,
}

impl DesktopNotifier {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            program: "notify-send".to_string(),
            timeout_ms: timeout_secs.saturating_mul(1000),
        }
    }

    /// Replaces the notifier binary (any program taking `notify-send` arguments).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    fn name(&self) -> &str {
        "desktop"
    }

    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let status = Command::new(&self.program)
            .arg(format!("--expire-time={}", self.timeout_ms))
            .arg("--app-name=tickwatch")
            .arg(subject)
            .arg(content)
            .status()
            .await
            .map_err(|e| NotifyError::Local(format!("{}: {}", self.program, e)))?;

        if !status.success() {
            return Err(NotifyError::Local(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}
