//! Error module for the SNN accelerator library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SNNError {
    /// Error for invalid arguments, e.g., non-positive duration or a ragged intensity field.
    InvalidArgument(String),
    /// Error for configuration files with an unrecognized extension.
    UnsupportedFormat(String),
    /// Error for I/O operations.
    IOError(String),
    /// Error while (de)serializing a configuration or a snapshot.
    ParseError(String),
    /// Error raised by a spike source while polling.
    SourceError(String),
    /// Error raised by a rendering sink.
    SinkError(String),
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            SNNError::UnsupportedFormat(e) => write!(f, "Unsupported file format: {}", e),
            SNNError::IOError(e) => write!(f, "I/O error: {}", e),
            SNNError::ParseError(e) => write!(f, "Parse error: {}", e),
            SNNError::SourceError(e) => write!(f, "Spike source error: {}", e),
            SNNError::SinkError(e) => write!(f, "Render sink error: {}", e),
        }
    }
}

impl Error for SNNError {}
