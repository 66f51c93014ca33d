use staking_models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid chain data: {0}")]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Aggregation worker unavailable")]
    WorkerUnavailable,

    #[error("Coordinator stopped")]
    CoordinatorStopped,
}

pub type Result<T> = std::result::Result<T, SyncError>;
