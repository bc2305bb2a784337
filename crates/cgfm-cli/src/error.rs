use cgfm::engine::config::ConfigError;
use cgfm::engine::error::SetupError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open log file '{path}': {source}", path = path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
