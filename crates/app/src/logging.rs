use tickwatch_core::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// # Summary
/// Installs the global tracing subscriber.
///
/// # Logic
/// 1. `RUST_LOG` wins over `logging.level`.
/// 2. Always logs to stdout.
/// 3. With `logging.dir` set, also writes a daily-rolling file there.
///
/// # Returns
/// The file writer guard; it must live until the process exits or buffered
/// lines are lost.
pub fn init(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    let (installed, guard) = match &cfg.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &cfg.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
            (registry.with(file_layer).try_init(), Some(guard))
        }
        None => (registry.try_init(), None),
    };

    if let Err(e) = installed {
        eprintln!("tracing subscriber already installed: {}", e);
    }
    guard
}
