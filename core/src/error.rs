use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration for '{key}': {message}")]
    Configuration { key: String, message: String },

    #[error("Cannot export snapshot: population is empty")]
    EmptyPopulation,

    #[error("Snapshot export to {} failed: {source}", .path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn export_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ExportIo {
            path: path.into(),
            source,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
