use std::path::PathBuf;

use topic_tangle_allocator::RoomError;
use topic_tangle_config::ConfigError;
use topic_tangle_telemetry::TelemetryError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    ParseInput {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid room: {0}")]
    Room(#[from] RoomError),
    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
