use std::io::Write;

use async_trait::async_trait;

use crate::{
    channels::{DeliveryChannel, DeliveryError},
    models::Notification,
};

/// A channel that prints digests to standard output.
#[derive(Debug, Default)]
pub struct StdoutChannel;

impl StdoutChannel {
    /// Creates a new `StdoutChannel`.
    pub fn new() -> Self {
        Self
    }

    fn format(notification: &Notification) -> String {
        let recipients = if notification.recipients.is_empty() {
            "(none)".to_string()
        } else {
            notification.recipients.join(", ")
        };
        format!(
            "=== Alert Digest: {} ===\nTo: {}\n{}\n",
            notification.subject, recipients, notification.text_body
        )
    }
}

#[async_trait]
impl DeliveryChannel for StdoutChannel {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", Self::format(notification))?;
        stdout.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
