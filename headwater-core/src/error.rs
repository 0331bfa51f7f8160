//! Core error types.

use std::io;
use thiserror::Error;

/// Errors produced while reading or writing wire-format values.
#[derive(Debug, Error)]
pub enum WireError {
    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended before a complete value was read.
    #[error("unexpected end of stream reading {context}")]
    Eof {
        /// What was being read when the stream ended.
        context: &'static str,
    },

    /// A length field exceeds its protocol maximum.
    #[error("{context} length {len} exceeds maximum {max}")]
    Oversize {
        /// What carried the oversized length.
        context: &'static str,
        /// The declared length.
        len: u64,
        /// The protocol maximum.
        max: u64,
    },
}

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;
