//! Error types for delivery channels.

use thiserror::Error;

/// Errors a delivery channel can report for a single send attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The channel configuration is unusable.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The transport failed before a response was received.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The remote end rejected the notification.
    #[error("Notification failed: {0}")]
    NotifyFailed(String),

    /// Writing to a local sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
