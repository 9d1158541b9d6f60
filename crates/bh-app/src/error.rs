//! Error types for the bh-app service layer.

use std::path::PathBuf;

use bh_api::ApiError;

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for both CLI and GUI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required input missing; caught before any request is issued.
    #[error("{0}")]
    Validation(String),

    #[error("A request is already in progress")]
    Busy,

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Failed to read model file: {path}")]
    ModelFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Background request stopped without a result")]
    WorkerLost,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bh-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<bh_results::ResultsError> for AppError {
    fn from(err: bh_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<bh_core::CoreError> for AppError {
    fn from(err: bh_core::CoreError) -> Self {
        AppError::Validation(err.to_string())
    }
}
