//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! rejected parameters and viewports, scene versioning, and edits addressed at unknown
//! buildings. Degenerate geometry is never reported here; the pipeline stages drop or
//! replace it instead.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("invalid viewport {width}x{height}: both sides must be >= 1")]
    InvalidViewport { width: f64, height: f64 },

    #[error("unsupported scene version {found} (current is {current})")]
    UnsupportedSceneVersion { found: u32, current: u32 },

    #[error("unknown building '{id}'")]
    UnknownBuilding { id: String },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
