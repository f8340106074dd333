use anyhow::Context;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::model::LoggingConfig;

struct Levels {
    stdout: LevelFilter,
    file: LevelFilter,
}

impl Levels {
    fn from_config(cfg: &LoggingConfig) -> anyhow::Result<Self> {
        let parse = |key: &str, raw: &str| {
            raw.parse::<LevelFilter>()
                .with_context(|| format!("logging.{} = '{}' is not a log level", key, raw))
        };
        Ok(Self {
            stdout: parse("stdout_level", &cfg.stdout_level)?,
            file: parse("file_level", &cfg.file_level)?,
        })
    }
}

/// Installs the global subscriber: stdout plus a daily rolling `zftopn.log`
/// written off-thread. Levels are validated before anything is installed.
///
/// Buffered file output is flushed when the returned guard drops, so hold it
/// for the lifetime of the process.
pub fn init_with(cfg: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let levels = Levels::from_config(cfg)?;

    let file_appender = tracing_appender::rolling::daily(&cfg.log_dir, "zftopn.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // worker thread names (zftopn-worker-N) identify the bucket's pool thread
    let stdout_layer = fmt::layer()
        .with_ansi(true)
        .with_thread_names(true)
        .with_filter(levels.stdout);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(file_writer)
        .with_filter(levels.file);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    info!(
        target: "zftopn::logging",
        log_dir = %cfg.log_dir,
        stdout = %levels.stdout,
        file = %levels.file,
        "Logging initialized"
    );
    Ok(guard)
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("zftopn=debug".parse().expect("valid directive"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;
