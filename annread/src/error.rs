//! Error type for container reads

use std::path::PathBuf;

use annread_core::{CoreError, FileFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unknown file format: {}", .0.display())]
    UnknownFormat(PathBuf),

    #[error("{0} support is not compiled in (enable the `{0}` feature)")]
    BackendUnavailable(FileFormat),

    #[error("storage error at `{path}`: {message}")]
    Store { path: String, message: String },

    #[error("cannot decode `{path}`: {reason}")]
    Decode { path: String, reason: String },

    #[error("cannot convert `{path}` to a sparse matrix: {reason}")]
    Conversion { path: String, reason: String },

    #[error("container has been closed")]
    ContainerClosed,

    #[error("required slots missing: {}", .0.join(", "))]
    MissingSlots(Vec<String>),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Map a backend library error at the storage boundary
    pub(crate) fn store(path: &str, err: impl std::fmt::Display) -> Self {
        Error::Store {
            path: display_path(path),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(path: &str, reason: impl Into<String>) -> Self {
        Error::Decode {
            path: display_path(path),
            reason: reason.into(),
        }
    }

    pub(crate) fn conversion(path: &str, reason: impl Into<String>) -> Self {
        Error::Conversion {
            path: display_path(path),
            reason: reason.into(),
        }
    }
}

fn display_path(path: &str) -> String {
    format!("/{path}")
}

pub type Result<T> = std::result::Result<T, Error>;
