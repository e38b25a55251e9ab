use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;

use super::{
    DeliveryConfig, ServerConfig, deserialize_duration_from_ms, deserialize_duration_from_seconds,
};

/// Prefix of the environment variables holding nested settings.
const ENV_PREFIX: &str = "ALERT_DIGEST";

/// Provides the default value for batch_window_duration.
fn default_batch_window() -> Duration {
    Duration::from_millis(30_000)
}

/// Provides the default value for shutdown_timeout.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Optional replacements for the built-in digest templates.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateConfig {
    /// minijinja source for the plain-text body.
    #[serde(default)]
    pub text: Option<String>,

    /// minijinja source for the HTML body.
    #[serde(default)]
    pub html: Option<String>,
}

/// Application configuration for the alert digest service.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Time from the first alert of an empty batch to its automatic flush.
    #[serde(
        rename = "batch_window_duration",
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_batch_window"
    )]
    pub batch_window: Duration,

    /// Destination used when no alert in a batch names one.
    #[serde(default)]
    pub default_notify_target: Option<String>,

    /// The maximum time in seconds to wait for the final flush on shutdown.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,

    /// The channel digests are delivered through.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Status server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Template overrides.
    #[serde(default)]
    pub templates: TemplateConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            batch_window: default_batch_window(),
            default_notify_target: None,
            shutdown_timeout: default_shutdown_timeout(),
            delivery: DeliveryConfig::default(),
            server: ServerConfig::default(),
            templates: TemplateConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` from `<config_dir>/app.yaml` (optional)
    /// overlaid with the process environment.
    ///
    /// Nested settings are read from `ALERT_DIGEST__`-prefixed variables such
    /// as `ALERT_DIGEST__DELIVERY__TYPE`. `BATCH_WINDOW_DURATION` and
    /// `DEFAULT_NOTIFY_TARGET` are also honored without the prefix and take
    /// precedence over everything else.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_sources(config_dir, None)
    }

    /// Like [`AppConfig::new`], but reads environment variables from `env`
    /// instead of the process environment when given.
    pub fn from_sources(
        config_dir: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let config_dir = config_dir.unwrap_or("configs");
        let app_yaml = Path::new(config_dir).join("app.yaml");
        let lookup = |key: &str| match &env {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        };

        let s = Config::builder()
            .add_source(File::from(app_yaml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env.clone()),
            )
            .set_override_option("batch_window_duration", lookup("BATCH_WINDOW_DURATION"))?
            .set_override_option("default_notify_target", lookup("DEFAULT_NOTIFY_TARGET"))?
            .build()?;
        s.try_deserialize()
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Sets the batch window.
    pub fn batch_window(mut self, window: Duration) -> Self {
        self.config.batch_window = window;
        self
    }

    /// Sets the default notify target.
    pub fn default_notify_target(mut self, target: &str) -> Self {
        self.config.default_notify_target = Some(target.to_string());
        self
    }

    /// Sets the delivery channel.
    pub fn delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.config.delivery = delivery;
        self
    }

    /// Sets the shutdown timeout.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}
