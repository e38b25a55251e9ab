//! Configuration module for the alert digest service.

mod app_config;
mod delivery;
mod helpers;
mod server;

pub use app_config::{AppConfig, AppConfigBuilder, TemplateConfig};
pub use delivery::{DeliveryConfig, WebhookChannelConfig};
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, serialize_duration_to_ms,
    serialize_duration_to_seconds,
};
pub use server::ServerConfig;
