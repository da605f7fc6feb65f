//! Error types for chatclock operations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatClockError {
    #[error("Failed to read chat export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid date order '{0}' (expected 'mdy' or 'dmy')")]
    InvalidDateOrder(String),

    #[error("Invalid counting policy '{0}' (expected 'start' or 'presence')")]
    InvalidCountingPolicy(String),
}

pub type Result<T> = std::result::Result<T, ChatClockError>;
