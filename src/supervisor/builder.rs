//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{
    channels::{DeliveryChannel, build_channel},
    config::AppConfig,
    engine::{AlertBatcher, BatcherSettings, Clock, SystemClock},
    notification::{DigestRenderer, template::TemplateService},
};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    channel: Option<Arc<dyn DeliveryChannel>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the delivery channel described by the configuration.
    pub fn channel(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Overrides the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Assembles the batcher and wraps it in a `Supervisor`.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;

        let channel = match self.channel {
            Some(channel) => channel,
            None => build_channel(&config.delivery)?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let templates = TemplateService::with_overrides(
            config.templates.text.clone(),
            config.templates.html.clone(),
        )?;

        tracing::info!(
            window_ms = config.batch_window.as_millis() as u64,
            channel = channel.name(),
            default_notify_target = ?config.default_notify_target,
            "Alert batcher configured."
        );

        let batcher = AlertBatcher::new(
            BatcherSettings::from(&config),
            clock,
            channel,
            DigestRenderer::new(templates),
        );
        Ok(Supervisor::new(config, batcher))
    }
}
