//! # Digest Renderer
//!
//! Turns the severity groups produced by the grouper into a transport-agnostic
//! [`Notification`]: a subject line, a plain-text body, an HTML body and the
//! structured [`Digest`] both bodies are rendered from.
//!
//! Aggregate counts (total alerts, distinct hosts, per-severity counts) are
//! computed once here and handed to the templates, so a custom template never
//! has to recount anything.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use minijinja::context;

use crate::{
    engine::grouper::SeverityGroup,
    models::{
        Alert, Digest, DigestEntry, DigestSection, Notification, Severity, SeverityCount,
    },
};

pub mod error;
pub mod template;

pub use error::RenderError;
use template::{HTML_TEMPLATE, TEXT_TEMPLATE, TemplateService};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn plural(count: usize, noun: &str) -> String {
    if count == 1 { format!("{} {}", count, noun) } else { format!("{} {}s", count, noun) }
}

/// Builds the subject line for a digest.
pub fn subject_line(total_alerts: usize, host_count: usize, highest: Severity) -> String {
    format!(
        "{} across {} — highest severity: {}",
        plural(total_alerts, "alert"),
        plural(host_count, "host"),
        highest
    )
}

fn entry(alert: &Alert) -> DigestEntry {
    DigestEntry {
        id: alert.id.to_string(),
        alert_type: alert.alert_type.to_string(),
        widget_title: alert.widget_title.clone(),
        host: alert.host_name.clone(),
        metric: alert.metric_name.clone(),
        value: alert.value_with_units(),
        threshold: alert.threshold_text(),
        received_at: alert.received_at.format(TIMESTAMP_FORMAT).to_string(),
        context: alert.additional_context.clone(),
    }
}

/// Builds the structured digest for `groups`, which must already be in
/// grouper order.
pub fn build_digest(
    groups: &[SeverityGroup],
    generated_at: DateTime<Utc>,
) -> Result<Digest, RenderError> {
    let highest_severity = groups.first().ok_or(RenderError::EmptyBatch)?.severity;

    let hosts: BTreeSet<&str> =
        groups.iter().flat_map(|g| g.alerts.iter().map(|a| a.host_name.as_str())).collect();

    let severity_counts = groups
        .iter()
        .map(|g| SeverityCount {
            severity: g.severity,
            label: g.severity.info().label,
            count: g.alerts.len(),
        })
        .collect::<Vec<_>>();

    let sections = groups
        .iter()
        .map(|g| {
            let info = g.severity.info();
            DigestSection {
                severity: g.severity,
                label: info.label,
                color: info.color,
                marker: info.marker,
                alerts: g.alerts.iter().map(entry).collect(),
            }
        })
        .collect();

    Ok(Digest {
        total_alerts: severity_counts.iter().map(|c| c.count).sum(),
        host_count: hosts.len(),
        highest_severity,
        severity_counts,
        sections,
        generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
    })
}

/// Renders severity groups into notifications.
pub struct DigestRenderer {
    templates: TemplateService,
}

impl DigestRenderer {
    /// Creates a renderer backed by the given templates.
    pub fn new(templates: TemplateService) -> Self {
        Self { templates }
    }

    /// Renders `groups` into a notification addressed to `recipients`.
    pub fn render(
        &self,
        groups: &[SeverityGroup],
        recipients: Vec<String>,
        generated_at: DateTime<Utc>,
    ) -> Result<Notification, RenderError> {
        let digest = build_digest(groups, generated_at)?;
        let subject = subject_line(digest.total_alerts, digest.host_count, digest.highest_severity);

        let context = context! {
            subject => &subject,
            recipients => &recipients,
            digest => &digest,
        };

        let text_body = self.templates.render(TEXT_TEMPLATE, &context)?;
        let html_body = self.templates.render(HTML_TEMPLATE, &context)?;

        Ok(Notification { recipients, subject, text_body, html_body, digest })
    }
}

impl Default for DigestRenderer {
    fn default() -> Self {
        Self::new(TemplateService::new())
    }
}
