//! # Delivery Channels
//!
//! The engine hands each rendered digest to exactly one [`DeliveryChannel`]
//! and awaits the result. Channels own their transport concerns, including
//! request timeouts; the engine treats any error as terminal for the batch.
//!
//! Two channels ship with the crate:
//!
//! - **`StdoutChannel`**: prints the subject and plain-text body.
//! - **`WebhookChannel`**: POSTs the whole notification as JSON.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{config::DeliveryConfig, models::Notification};

pub mod error;
mod stdout;
mod webhook;

pub use error::DeliveryError;
pub use stdout::StdoutChannel;
pub use webhook::WebhookChannel;

/// The transport a rendered digest is sent through.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Sends the notification once. Implementations must not retry on the
    /// engine's behalf.
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError>;

    /// A short name used in logs.
    fn name(&self) -> &'static str;
}

/// Builds the channel described by the configuration.
pub fn build_channel(config: &DeliveryConfig) -> Result<Arc<dyn DeliveryChannel>, DeliveryError> {
    let channel: Arc<dyn DeliveryChannel> = match config {
        DeliveryConfig::Stdout => Arc::new(StdoutChannel::new()),
        DeliveryConfig::Webhook(webhook) => Arc::new(WebhookChannel::new(webhook.clone())?),
    };
    tracing::debug!(channel = channel.name(), "Delivery channel initialized.");
    Ok(channel)
}
