use crate::settings::LogSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `settings.level`. Output goes through a
/// non-blocking writer, either to stdout or, when `settings.directory` is set,
/// to a daily rolling `todo-api.log` file. The returned guard flushes pending
/// log lines on drop and must be held for the lifetime of the process.
pub fn init_tracing(settings: &LogSettings) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "todo-api.log");
            tracing_appender::non_blocking(appender)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let ansi = settings.directory.is_none();
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init();

    if let Err(e) = result {
        // Already installed (e.g. by a test harness); keep the existing one.
        eprintln!("Tracing subscriber was not installed: {}", e);
    }

    guard
}
