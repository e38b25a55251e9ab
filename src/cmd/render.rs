//! Renders the digest a batch of alerts would produce, without delivering it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::{
    config::AppConfig,
    engine::{group_by_severity, resolve_recipients},
    models::{AlertError, AlertId, AlertInput, Notification},
    notification::{
        DigestRenderer, RenderError,
        template::{TemplateService, TemplateServiceError},
    },
};

/// Errors raised by the `render` command.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    /// The input file is not a JSON array of alerts.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// An alert in the input failed validation.
    #[error("Alert #{index} is invalid: {source}")]
    InvalidAlert {
        /// Zero-based position of the alert in the input array.
        index: usize,
        /// The validation error.
        source: AlertError,
    },
    /// A template override failed to compile.
    #[error("Template error: {0}")]
    Template(#[from] TemplateServiceError),
    /// The digest could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Which part of the notification to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Subject and plain-text body.
    #[default]
    Text,
    /// HTML body.
    Html,
    /// The whole notification as JSON.
    Json,
}

/// Arguments of the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Path to a JSON file holding an array of alerts.
    #[arg(short, long)]
    pub input: PathBuf,
    /// What to print.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Loads the alerts in `path` and renders them as a single batch.
pub fn render_file(
    path: &Path,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<Notification, Error> {
    let contents = std::fs::read_to_string(path)?;
    let inputs: Vec<AlertInput> = serde_json::from_str(&contents)?;

    let alerts = inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            input
                .validate()
                .map(|alert| alert.stamp(AlertId(index as u64 + 1), now))
                .map_err(|source| Error::InvalidAlert { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let templates = TemplateService::with_overrides(
        config.templates.text.clone(),
        config.templates.html.clone(),
    )?;
    let recipients = resolve_recipients(&alerts, config.default_notify_target.as_deref());
    let notification =
        DigestRenderer::new(templates).render(&group_by_severity(&alerts), recipients, now)?;
    Ok(notification)
}

/// Executes the `render` command, printing the digest to stdout.
pub fn execute(args: RenderArgs, config: &AppConfig) -> Result<(), Error> {
    let notification = render_file(&args.input, config, Utc::now())?;
    tracing::debug!(
        alerts = notification.digest.total_alerts,
        recipients = ?notification.recipients,
        "Rendered digest."
    );

    match args.format {
        OutputFormat::Text => {
            println!("Subject: {}", notification.subject);
            if !notification.recipients.is_empty() {
                println!("To: {}", notification.recipients.join(", "));
            }
            println!();
            print!("{}", notification.text_body);
        }
        OutputFormat::Html => print!("{}", notification.html_body),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notification)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_input(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_render_file_groups_alerts() {
        let file = write_input(
            r#"[
              {"alertType": "gauge", "severity": "warning", "widgetTitle": "Load",
               "hostName": "web-2", "metricName": "CPU", "currentValue": 81, "threshold": 80},
              {"alertType": "gauge", "severity": "critical", "widgetTitle": "Disk",
               "hostName": "db-1", "metricName": "disk", "currentValue": 97, "threshold": 90,
               "notifyTarget": "dba@example.com"}
            ]"#,
        );

        let notification = render_file(file.path(), &AppConfig::default(), Utc::now()).unwrap();

        assert_eq!(notification.subject, "2 alerts across 2 hosts — highest severity: CRITICAL");
        assert_eq!(notification.recipients, vec!["dba@example.com".to_string()]);
        assert_eq!(notification.digest.sections[0].alerts[0].host, "db-1");
    }

    #[test]
    fn test_render_file_reports_invalid_alert_position() {
        let file = write_input(r#"[{"alertType": "gauge"}]"#);

        let result = render_file(file.path(), &AppConfig::default(), Utc::now());

        assert!(matches!(result, Err(Error::InvalidAlert { index: 0, .. })));
    }

    #[test]
    fn test_render_file_rejects_empty_array() {
        let file = write_input("[]");

        let result = render_file(file.path(), &AppConfig::default(), Utc::now());

        assert!(matches!(result, Err(Error::Render(RenderError::EmptyBatch))));
    }
}
