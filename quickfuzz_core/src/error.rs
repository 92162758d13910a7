#![allow(missing_docs)]
use std::io::ErrorKind;
use thiserror::Error;

/// Custom Result type used in this crate
pub type QuickFuzzResult<T> = Result<T, QuickFuzzError>;

#[derive(Debug, Error)]
pub enum QuickFuzzError {
    #[error("{err_msg}")]
    Custom { err_msg: String },
    #[error("Maximum number of retries ({retries}) reached for {target}.")]
    RetriesExhausted { target: String, retries: usize },
    #[error("Invalid configuration: {err_msg}")]
    Config { err_msg: String },
    #[error("TLS error: {err_msg}")]
    Tls { err_msg: String },
    #[error("Output file {path} already exists, use `--overwrite` to replace it.")]
    OutputExists { path: String },
    #[error("{err}")]
    IoError { err: std::io::Error },
    #[error("{err}")]
    Serde { err: serde_json::Error },
}

impl QuickFuzzError {
    /// The target actively refused the connection attempt
    #[must_use]
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, QuickFuzzError::IoError { err } if err.kind() == ErrorKind::ConnectionRefused)
    }

    /// The peer reset an established connection
    #[must_use]
    pub fn is_connection_reset(&self) -> bool {
        matches!(self, QuickFuzzError::IoError { err } if err.kind() == ErrorKind::ConnectionReset)
    }
}

impl From<std::io::Error> for QuickFuzzError {
    fn from(err: std::io::Error) -> Self {
        QuickFuzzError::IoError { err }
    }
}

impl From<serde_json::Error> for QuickFuzzError {
    fn from(err: serde_json::Error) -> Self {
        QuickFuzzError::Serde { err }
    }
}
