//! Error types for ridgeline

use thiserror::Error;

/// Main error type for ridgeline operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Need 2 start points, got {0}")]
    InsufficientStartPoints(usize),

    #[error("No contours loaded")]
    EmptyTopography,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ridgeline operations
pub type Result<T> = std::result::Result<T, Error>;
