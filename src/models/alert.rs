//! Data models for alerts raised by the dashboard.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use thiserror::Error;

use super::severity::Severity;

/// The kind of monitored entity that produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertType {
    /// A single gauge widget.
    Gauge,
    /// A chart plotting several series.
    MultiChart,
    /// Host or service availability.
    Availability,
    /// Count of open problems.
    Problems,
    /// A single metric value widget.
    MetricValue,
}

impl AlertType {
    /// The camel-case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::Gauge => "gauge",
            AlertType::MultiChart => "multiChart",
            AlertType::Availability => "availability",
            AlertType::Problems => "problems",
            AlertType::MetricValue => "metricValue",
        }
    }
}

impl FromStr for AlertType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.trim().chars().filter(|c| *c != '_' && *c != '-').collect::<String>().to_lowercase();
        match normalized.as_str() {
            "gauge" => Ok(AlertType::Gauge),
            "multichart" => Ok(AlertType::MultiChart),
            "availability" => Ok(AlertType::Availability),
            "problems" => Ok(AlertType::Problems),
            "metricvalue" => Ok(AlertType::MetricValue),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value exactly as the alert source reported it. The engine never does
/// arithmetic on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    /// A JSON number, kept in its original textual form (`81.50` stays
    /// `81.50`, `1e2` stays `1e2`).
    Number(serde_json::Number),
    /// Free text such as `"down"` or `"97%"`.
    Text(String),
}

impl<'de> Deserialize<'de> for DisplayValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(DisplayValue::Number(n)),
            Value::String(s) => Ok(DisplayValue::Text(s)),
            other => Err(de::Error::custom(format!("expected a number or a string, got {other}"))),
        }
    }
}

impl DisplayValue {
    fn is_blank(&self) -> bool {
        matches!(self, DisplayValue::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => write!(f, "{}", n),
            DisplayValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DisplayValue {
    fn from(value: i64) -> Self {
        DisplayValue::Number(value.into())
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        DisplayValue::Text(value.to_string())
    }
}

/// Identifier assigned to an alert when it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub u64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

/// An alert as submitted by an alert source. Every field is optional on the
/// wire; [`AlertInput::validate`] decides whether it can enter a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertInput {
    /// Kind of widget that raised the alert.
    #[serde(default)]
    pub alert_type: Option<String>,
    /// Raw severity label.
    #[serde(default)]
    pub severity: Option<String>,
    /// Title of the dashboard widget.
    #[serde(default)]
    pub widget_title: Option<String>,
    /// Host the condition was detected on.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Metric that crossed its threshold.
    #[serde(default, alias = "metric")]
    pub metric_name: Option<String>,
    /// Observed value.
    #[serde(default, alias = "value")]
    pub current_value: Option<DisplayValue>,
    /// Configured threshold.
    #[serde(default)]
    pub threshold: Option<DisplayValue>,
    /// Units of the value, e.g. `%`.
    #[serde(default)]
    pub units: Option<String>,
    /// Human readable comparison, e.g. `above`.
    #[serde(default)]
    pub condition: Option<String>,
    /// Supplementary display strings such as trend or duration.
    #[serde(default)]
    pub additional_context: Option<BTreeMap<String, String>>,
    /// Explicit destination for this alert's notification.
    #[serde(default)]
    pub notify_target: Option<String>,
}

/// Errors surfaced synchronously to an alert source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlertError {
    /// The alert was missing required fields or carried an unknown type.
    #[error("Invalid alert, missing or invalid fields: {}", .fields.join(", "))]
    InvalidAlert {
        /// Names of the offending fields.
        fields: Vec<&'static str>,
    },
}

/// An alert that passed validation but has not been stamped by the collector.
#[derive(Debug, Clone)]
pub struct NewAlert {
    alert_type: AlertType,
    severity: Severity,
    widget_title: String,
    host_name: String,
    metric_name: String,
    current_value: DisplayValue,
    threshold: DisplayValue,
    units: Option<String>,
    condition: Option<String>,
    additional_context: BTreeMap<String, String>,
    notify_target: Option<String>,
}

fn required_text(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl AlertInput {
    /// Checks the required fields and normalizes the severity.
    pub fn validate(self) -> Result<NewAlert, AlertError> {
        let mut fields = Vec::new();

        let alert_type = match required_text(&self.alert_type) {
            Some(raw) => raw.parse::<AlertType>().ok(),
            None => None,
        };
        if alert_type.is_none() {
            fields.push("alert_type");
        }
        let widget_title = required_text(&self.widget_title);
        if widget_title.is_none() {
            fields.push("widget_title");
        }
        let host_name = required_text(&self.host_name);
        if host_name.is_none() {
            fields.push("host_name");
        }
        let metric_name = required_text(&self.metric_name);
        if metric_name.is_none() {
            fields.push("metric_name");
        }
        let current_value = self.current_value.filter(|v| !v.is_blank());
        if current_value.is_none() {
            fields.push("current_value");
        }
        let threshold = self.threshold.filter(|v| !v.is_blank());
        if threshold.is_none() {
            fields.push("threshold");
        }

        match (alert_type, widget_title, host_name, metric_name, current_value, threshold) {
            (
                Some(alert_type),
                Some(widget_title),
                Some(host_name),
                Some(metric_name),
                Some(current_value),
                Some(threshold),
            ) => Ok(NewAlert {
                alert_type,
                severity: Severity::classify(self.severity.as_deref()),
                widget_title,
                host_name,
                metric_name,
                current_value,
                threshold,
                units: optional_text(self.units),
                condition: optional_text(self.condition),
                additional_context: self.additional_context.unwrap_or_default(),
                notify_target: optional_text(self.notify_target),
            }),
            _ => Err(AlertError::InvalidAlert { fields }),
        }
    }
}

impl NewAlert {
    /// Assigns the identity and receive time, producing an immutable alert.
    pub fn stamp(self, id: AlertId, received_at: DateTime<Utc>) -> Alert {
        Alert {
            id,
            alert_type: self.alert_type,
            severity: self.severity,
            widget_title: self.widget_title,
            host_name: self.host_name,
            metric_name: self.metric_name,
            current_value: self.current_value,
            threshold: self.threshold,
            units: self.units,
            condition: self.condition,
            additional_context: self.additional_context,
            notify_target: self.notify_target,
            received_at,
        }
    }
}

/// An accepted alert. Owned by the batch it was added to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Identifier assigned at ingest.
    pub id: AlertId,
    /// Kind of widget that raised the alert.
    pub alert_type: AlertType,
    /// Normalized severity.
    pub severity: Severity,
    /// Title of the dashboard widget.
    pub widget_title: String,
    /// Host the condition was detected on.
    pub host_name: String,
    /// Metric that crossed its threshold.
    pub metric_name: String,
    /// Observed value, verbatim.
    pub current_value: DisplayValue,
    /// Configured threshold, verbatim.
    pub threshold: DisplayValue,
    /// Units of the value.
    pub units: Option<String>,
    /// Human readable comparison.
    pub condition: Option<String>,
    /// Supplementary display strings.
    pub additional_context: BTreeMap<String, String>,
    /// Explicit destination requested by the source.
    pub notify_target: Option<String>,
    /// When the collector accepted the alert.
    pub received_at: DateTime<Utc>,
}

impl Alert {
    /// The current value followed by its units, if any.
    pub fn value_with_units(&self) -> String {
        match &self.units {
            Some(units) => format!("{}{}", self.current_value, units),
            None => self.current_value.to_string(),
        }
    }

    /// The condition and threshold as a single phrase, e.g. `above 80%`.
    pub fn threshold_text(&self) -> String {
        let threshold = match &self.units {
            Some(units) => format!("{}{}", self.threshold, units),
            None => self.threshold.to_string(),
        };
        match &self.condition {
            Some(condition) => format!("{} {}", condition, threshold),
            None => format!("threshold {}", threshold),
        }
    }
}
