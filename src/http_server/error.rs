//! Errors raised while starting or running the HTTP server.

use std::net::AddrParseError;

use thiserror::Error;

/// Errors that stop the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address could not be parsed.
    #[error("Invalid listen address '{0}': {1}")]
    InvalidAddress(String, AddrParseError),

    /// Binding or accepting failed.
    #[error("HTTP server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
