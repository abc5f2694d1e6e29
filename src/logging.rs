use std::error::Error;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a console layer (compact, human-readable) plus a daily-rolling
/// JSON file layer under `log_dir`. The returned guard must be kept alive
/// for the process's lifetime; dropping it flushes the non-blocking file
/// writer.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard, Box<dyn Error + Send + Sync>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "marqdb.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();

    let console_layer = fmt::layer().with_writer(std::io::stdout).with_target(false).with_level(true).compact();

    let file_layer = fmt::layer().with_writer(file_writer).json().with_current_span(true).with_span_list(true);

    tracing_subscriber::registry().with(filter).with(console_layer).with(file_layer).init();

    Ok(guard)
}
