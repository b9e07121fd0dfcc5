use thiserror::Error;

/// General codec errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input data.
    #[error("Invalid input data: {0}")]
    InvalidInputData(String),
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Frame error.
    #[error("Frame error: {0}")]
    FrameError(String),
    /// Tile error.
    #[error("Tile error: {0}")]
    TileError(String),
    /// Entropy coder error.
    #[error("Entropy coder error: {0}")]
    EntropyError(String),
}

/// A specialised `Result` type for codec operations.
pub type Result<T> = ::std::result::Result<T, Error>;
