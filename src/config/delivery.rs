use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use url::Url;

use super::deserialize_duration_from_ms;

/// Provides the default value for the webhook request timeout.
fn default_webhook_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Which channel rendered digests are delivered through.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeliveryConfig {
    /// Print digests to standard output.
    #[default]
    Stdout,
    /// POST digests to an HTTP endpoint.
    Webhook(WebhookChannelConfig),
}

/// Settings for the webhook channel.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WebhookChannelConfig {
    /// Endpoint receiving the JSON notification.
    pub url: Url,

    /// Per-request timeout in milliseconds.
    #[serde(
        rename = "timeout_ms",
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_webhook_timeout"
    )]
    pub timeout: Duration,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}
