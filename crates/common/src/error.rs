//! Common error types for the ipset crates.

use std::fmt;

/// A specialized Result type for ipset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for ipset operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The external tool exited with a non-zero status. Carries the
    /// diagnostic text with the version banner and help hint removed.
    #[error("ipset returned error \"{0}\"")]
    IPSet(String),

    #[error("cannot decode ipset output: {0}")]
    Decode(String),

    /// The command translated to an empty argument vector.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("set {0} not found in ipset output")]
    SetNotFound(String),

    #[error("expected 1 set named {name}, received {count}")]
    AmbiguousSet { name: String, count: usize },

    #[error("ipset version is nil")]
    VersionUnavailable,
}

impl Error {
    /// Create a new tool failure error.
    pub fn ipset(msg: impl fmt::Display) -> Self {
        Error::IPSet(msg.to_string())
    }

    /// Create a new decode error.
    pub fn decode(msg: impl fmt::Display) -> Self {
        Error::Decode(msg.to_string())
    }

    /// Create a new invalid command error.
    pub fn invalid_command(msg: impl fmt::Display) -> Self {
        Error::InvalidCommand(msg.to_string())
    }

    /// Create a new unsupported command error.
    pub fn unsupported_command(msg: impl fmt::Display) -> Self {
        Error::UnsupportedCommand(msg.to_string())
    }

    /// True when the error came from the external tool itself rather than
    /// from local validation or decoding.
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, Error::IPSet(_) | Error::Io(_))
    }
}
