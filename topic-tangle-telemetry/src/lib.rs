use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_LEVEL: &str = "info,topic_tangle_allocator=info,topic_tangle_cli=info";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install the log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// `RUST_LOG` wins over `directives`, which win over [`DEFAULT_LOG_LEVEL`].
pub fn env_filter(directives: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(directives.unwrap_or(DEFAULT_LOG_LEVEL))?)
}

/// Logs to stderr so stdout stays free for results.
///
/// Fails instead of panicking when a global subscriber is already installed.
pub fn setup_telemetry(directives: Option<&str>) -> Result<(), TelemetryError> {
    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter(directives)?))
        .try_init()?;
    Ok(())
}
