use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    engine::grouper::group_by_severity,
    models::{AlertId, AlertInput, DisplayValue, Notification},
    notification::DigestRenderer,
};

/// A builder for creating `AlertInput` instances for testing.
#[derive(Debug, Clone)]
pub struct AlertInputBuilder {
    input: AlertInput,
}

impl AlertInputBuilder {
    /// Creates a complete gauge alert for `host` that passes validation.
    pub fn new(host: &str) -> Self {
        Self {
            input: AlertInput {
                alert_type: Some("gauge".to_string()),
                severity: Some("warning".to_string()),
                widget_title: Some("System Load".to_string()),
                host_name: Some(host.to_string()),
                metric_name: Some("cpu".to_string()),
                current_value: Some(DisplayValue::from(81)),
                threshold: Some(DisplayValue::from(80)),
                units: None,
                condition: None,
                additional_context: None,
                notify_target: None,
            },
        }
    }

    /// Sets the raw severity label.
    pub fn severity(mut self, severity: &str) -> Self {
        self.input.severity = Some(severity.to_string());
        self
    }

    /// Sets the metric name.
    pub fn metric(mut self, metric: &str) -> Self {
        self.input.metric_name = Some(metric.to_string());
        self
    }

    /// Sets the raw alert type.
    pub fn alert_type(mut self, alert_type: &str) -> Self {
        self.input.alert_type = Some(alert_type.to_string());
        self
    }

    /// Sets the widget title.
    pub fn widget_title(mut self, title: &str) -> Self {
        self.input.widget_title = Some(title.to_string());
        self
    }

    /// Sets the observed value and the threshold.
    pub fn values(mut self, current: i64, threshold: i64) -> Self {
        self.input.current_value = Some(DisplayValue::from(current));
        self.input.threshold = Some(DisplayValue::from(threshold));
        self
    }

    /// Sets the units.
    pub fn units(mut self, units: &str) -> Self {
        self.input.units = Some(units.to_string());
        self
    }

    /// Sets the condition.
    pub fn condition(mut self, condition: &str) -> Self {
        self.input.condition = Some(condition.to_string());
        self
    }

    /// Adds an entry to the additional context.
    pub fn context(mut self, key: &str, value: &str) -> Self {
        self.input
            .additional_context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Sets the explicit notify target.
    pub fn notify_target(mut self, target: &str) -> Self {
        self.input.notify_target = Some(target.to_string());
        self
    }

    /// Builds the `AlertInput`.
    pub fn build(self) -> AlertInput {
        self.input
    }
}

/// Renders a two-alert notification with the default templates.
pub fn sample_notification(generated_at: DateTime<Utc>) -> Notification {
    let alerts: Vec<_> = [
        AlertInputBuilder::new("db-1").severity("critical").metric("disk").values(97, 90),
        AlertInputBuilder::new("web-1").severity("warning"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, builder)| {
        builder
            .build()
            .validate()
            .expect("builder produces valid alerts")
            .stamp(AlertId(i as u64 + 1), generated_at)
    })
    .collect();

    DigestRenderer::default()
        .render(&group_by_severity(&alerts), Vec::new(), generated_at)
        .expect("default templates render")
}
