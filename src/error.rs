//! Centralized error types for squishmb.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the squishmb library.
#[derive(Error, Debug)]
pub enum SquishError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The area has no messages; there is nothing to read.
    #[error("Empty area")]
    EmptyArea,

    /// The requested position is outside the live index sequence.
    #[error("Position {position} out of range (area has {count} messages)")]
    OutOfRange { position: u32, count: u32 },

    /// A frame header at the given offset is not a valid Squish frame.
    #[error("Bad frame header at offset {offset}: {reason}")]
    BadFrame { offset: u32, reason: String },

    /// The raw message text could not be split into kludges and body.
    #[error("Message parse error: {0}")]
    Parse(String),
}

/// Convenience alias for `Result<T, SquishError>`.
pub type Result<T> = std::result::Result<T, SquishError>;

impl SquishError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `BadFrame` variant.
    pub fn bad_frame(offset: u32, reason: impl Into<String>) -> Self {
        Self::BadFrame {
            offset,
            reason: reason.into(),
        }
    }
}
