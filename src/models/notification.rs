//! Data models for rendered notifications.

use std::collections::BTreeMap;

use serde::Serialize;

use super::severity::Severity;

/// A fully rendered digest, ready to be handed to a delivery channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Destinations for this digest. Empty when neither the alerts nor the
    /// configuration named one; channels decide what that means.
    pub recipients: Vec<String>,
    /// One-line summary.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
    /// Structured form of the same content.
    pub digest: Digest,
}

/// The structured body of a notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Digest {
    /// Number of alerts in the batch.
    pub total_alerts: usize,
    /// Number of distinct hosts in the batch.
    pub host_count: usize,
    /// Most urgent severity present.
    pub highest_severity: Severity,
    /// Alert counts per severity, in rank order, omitting zeros.
    pub severity_counts: Vec<SeverityCount>,
    /// Sections in rank order.
    pub sections: Vec<DigestSection>,
    /// When the digest was rendered, formatted for display.
    pub generated_at: String,
}

/// Number of alerts with a given severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    /// The severity.
    pub severity: Severity,
    /// Upper-case label.
    pub label: &'static str,
    /// How many alerts carried it.
    pub count: usize,
}

/// All alerts of one severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestSection {
    /// Severity shared by every entry.
    pub severity: Severity,
    /// Upper-case label.
    pub label: &'static str,
    /// Hex colour for the HTML body.
    pub color: &'static str,
    /// Plain-text marker.
    pub marker: &'static str,
    /// Entries ordered by host name, then arrival.
    pub alerts: Vec<DigestEntry>,
}

/// Display record for a single alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestEntry {
    /// Alert identifier.
    pub id: String,
    /// Kind of widget.
    pub alert_type: String,
    /// Widget title.
    pub widget_title: String,
    /// Host name.
    pub host: String,
    /// Metric name.
    pub metric: String,
    /// Current value with units appended.
    pub value: String,
    /// Condition and threshold phrase.
    pub threshold: String,
    /// Receive time, formatted for display.
    pub received_at: String,
    /// Supplementary display strings, sorted by key.
    pub context: BTreeMap<String, String>,
}
