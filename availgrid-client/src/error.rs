use availgrid_core::GridShapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response. Displays the server's `detail` unchanged.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid service URL: {0}")]
    Url(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed grid: {0}")]
    Grid(#[from] GridShapeError),
}
