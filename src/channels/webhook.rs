//! Webhook delivery channel.
//!
//! Posts the whole notification (subject, both bodies and the structured
//! digest) as a JSON document. The request timeout belongs to the channel so
//! a slow endpoint cannot hold a flush open indefinitely.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{
    channels::{DeliveryChannel, DeliveryError},
    config::WebhookChannelConfig,
    models::Notification,
};

/// Delivers notifications to an HTTP endpoint.
#[derive(Debug)]
pub struct WebhookChannel {
    config: WebhookChannelConfig,
    client: reqwest::Client,
    headers: HeaderMap,
}

impl WebhookChannel {
    /// Creates a new webhook channel, validating the configured headers.
    pub fn new(config: WebhookChannelConfig) -> Result<Self, DeliveryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );
        for (key, value) in &config.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                DeliveryError::ConfigError(format!("Invalid header name: {key}: {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                DeliveryError::ConfigError(format!("Invalid header value for {key}: {e}"))
            })?;
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, client, headers })
    }
}

#[async_trait]
impl DeliveryChannel for WebhookChannel {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.config.url.clone())
            .headers(self.headers.clone())
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::NotifyFailed(format!(
                "Webhook request failed with status: {status}"
            )));
        }

        tracing::debug!(url = %self.config.url, %status, "Webhook accepted digest.");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
