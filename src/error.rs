//! Error types shared by the remote session, the batch job and the CLI.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrismError {
    #[error("unknown variable name: {0}")]
    UnknownVariable(String),

    #[error("resolution must be either \"4km\" or \"800m\", got: {0}")]
    UnknownResolution(String),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("max date {max} must not be before min date {min}")]
    InvalidRange { min: String, max: String },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("path does not exist: {}", .0.display())]
    MissingDestination(PathBuf),

    #[error("cannot query PRISM folder `{folder}` after {attempts} attempts")]
    Connectivity { folder: String, attempts: u32 },

    #[error("{matches} files in `{folder}` match `{token}`, expected at most one")]
    AmbiguousListing {
        folder: String,
        token: String,
        matches: usize,
    },

    #[error("not connected to {0}")]
    NotConnected(String),

    #[error("transfer of `{path}` failed: {reason}")]
    Transfer { path: String, reason: String },

    #[error("cannot extract `{}`: {reason}", .path.display())]
    Archive { path: PathBuf, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = PrismError> = std::result::Result<T, E>;
