use anyhow::Context as _;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt as _,
};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "syringe_pump.log";

/// Installs the global subscriber. Stdout carries command replies, so the
/// console layer writes to stderr.
///
/// Keep the returned guard alive for as long as file logs should be flushed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard): (Option<Box<dyn Layer<Registry> + Send + Sync>>, _) =
        match &config.directory {
            Some(directory) => {
                let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let layer = if config.json {
                    fmt::Layer::new().json().with_writer(writer).boxed()
                } else {
                    fmt::Layer::new().with_ansi(false).with_writer(writer).boxed()
                };

                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global subscriber")?;

    Ok(guard)
}
