use thiserror::Error;

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid site count: {0} (expected 1, 2 or 3)")]
    InvalidSiteCount(u8),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Degenerate bounds: width={width}, height={height}")]
    DegenerateBounds { width: f64, height: f64 },

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LevelError>;
