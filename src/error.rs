//! Error type shared by the loaders, the renderer and the application shell.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("NRRD format error: {0}")]
    Nrrd(String),

    #[error("VTK format error: {0}")]
    Vtk(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),
}

impl Error {
    /// Wraps an I/O failure with the path that caused it.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for viewer operations
pub type Result<T> = std::result::Result<T, Error>;
