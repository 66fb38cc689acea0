use std::path::PathBuf;

use availgrid_client::ClientError;
use availgrid_core::{ActionError, DayError, ExportError, RequestError, SessionError, TimeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Config error in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Session(#[from] SessionError<ClientError>),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("Invalid time: {0}")]
    Time(#[from] TimeError),

    #[error(transparent)]
    Day(#[from] DayError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cancelled.")]
    Cancelled,

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
