//! The Supervisor module manages the lifecycle of the alert digest service.
//!
//! The supervisor owns the [`AlertBatcher`] and every long-running task that
//! feeds or observes it:
//!
//! - **Signal handling**: `SIGINT`/`SIGTERM` start a graceful shutdown.
//! - **Ingest**: alerts are read as JSON lines from the alert source. End of
//!   input also starts a graceful shutdown.
//! - **Status server**: optional axum server exposing `/health` and `/status`.
//!
//! On shutdown the supervisor stops its tasks and force-flushes the pending
//! batch, bounded by `shutdown_timeout`.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    signal,
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use crate::{
    channels::DeliveryError,
    config::AppConfig,
    engine::AlertBatcher,
    http_server,
    models::AlertInput,
    notification::template::TemplateServiceError,
};

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// The configured delivery channel could not be created.
    #[error("Failed to create delivery channel: {0}")]
    DeliveryChannel(#[from] DeliveryError),

    /// A configured template override failed to compile.
    #[error("Invalid digest template: {0}")]
    Template(#[from] TemplateServiceError),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// The batcher alerts are fed into.
    batcher: AlertBatcher,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: JoinSet<()>,
}

impl Supervisor {
    /// Creates a new Supervisor instance.
    pub fn new(config: AppConfig, batcher: AlertBatcher) -> Self {
        Self {
            config: Arc::new(config),
            batcher,
            cancellation_token: CancellationToken::new(),
            join_set: JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// A handle to the supervised batcher.
    pub fn batcher(&self) -> AlertBatcher {
        self.batcher.clone()
    }

    /// A token that stops the supervisor when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Runs until a shutdown signal, the end of `source` or a cancelled
    /// token, then flushes the pending batch.
    pub async fn run<R>(mut self, source: R) -> Result<(), SupervisorError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to register SIGTERM handler.");
                        std::future::pending::<()>().await;
                    }
                }
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
                _ = cancellation_token.cancelled() => return,
            }

            cancellation_token.cancel();
        });

        if self.config.server.enabled {
            let listen_address = self.config.server.listen_address.clone();
            let batcher = self.batcher.clone();
            let http_cancellation_token = self.cancellation_token.clone();
            self.join_set.spawn(async move {
                if let Err(e) =
                    http_server::run_server(&listen_address, batcher, http_cancellation_token).await
                {
                    tracing::error!(error = %e, "HTTP server stopped.");
                }
            });
        }

        let batcher = self.batcher.clone();
        let ingest_cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            tokio::select! {
                _ = ingest_lines(source, batcher) => {
                    tracing::info!("Alert source closed, initiating graceful shutdown.");
                    ingest_cancellation_token.cancel();
                }
                _ = ingest_cancellation_token.cancelled() => {}
            }
        });

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!(error = ?e, "A supervised task failed. Initiating shutdown.");
                            self.cancellation_token.cancel();
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        self.join_set.shutdown().await;
        tracing::info!("All supervised tasks have completed.");

        let shutdown_timeout = self.config.shutdown_timeout;
        if tokio::time::timeout(shutdown_timeout, self.batcher.shutdown()).await.is_err() {
            tracing::warn!(
                "Final flush did not complete within the timeout of {:?}. Continuing shutdown.",
                shutdown_timeout
            );
        }

        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}

/// Feeds every JSON line of `source` to the batcher until end of input.
async fn ingest_lines<R>(source: R, batcher: AlertBatcher)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = source.lines();
    let mut line_number = 0usize;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read from alert source.");
                break;
            }
        };
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let input: AlertInput = match serde_json::from_str(&line) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(line = line_number, error = %e, "Skipping malformed alert line.");
                continue;
            }
        };

        if let Ok(id) = batcher.add_alert(input).await {
            tracing::debug!(line = line_number, alert_id = %id, "Alert accepted.");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_helpers::{AlertInputBuilder, RecordingChannel};

    #[tokio::test]
    async fn test_ingest_skips_malformed_and_invalid_lines() {
        let channel = Arc::new(RecordingChannel::new());
        let supervisor = Supervisor::builder()
            .config(AppConfig::builder().batch_window(Duration::from_secs(3600)).build())
            .channel(channel.clone())
            .build()
            .unwrap();
        let batcher = supervisor.batcher();

        let valid = serde_json::to_string(&AlertInputBuilder::new("web-1").build()).unwrap();
        let input = format!("{valid}\nnot json\n\n{{\"hostName\": \"web-2\"}}\n{valid}\n");

        ingest_lines(input.as_bytes(), batcher.clone()).await;

        let stats = batcher.stats().await;
        assert_eq!(stats.pending_alerts, 2);
        assert_eq!(stats.alerts_rejected, 1);
    }

    #[tokio::test]
    async fn test_run_flushes_on_end_of_input() {
        let channel = Arc::new(RecordingChannel::new());
        let supervisor = Supervisor::builder()
            .config(AppConfig::builder().batch_window(Duration::from_secs(3600)).build())
            .channel(channel.clone())
            .build()
            .unwrap();

        let input = [
            AlertInputBuilder::new("web-1").severity("info").build(),
            AlertInputBuilder::new("db-1").severity("critical").build(),
        ]
        .iter()
        .map(|a| serde_json::to_string(a).unwrap())
        .collect::<Vec<_>>()
        .join("\n");

        tokio::time::timeout(Duration::from_secs(5), supervisor.run(std::io::Cursor::new(input)))
            .await
            .expect("supervisor should stop at end of input")
            .unwrap();

        let deliveries = channel.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].digest.total_alerts, 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let channel = Arc::new(RecordingChannel::new());
        let supervisor = Supervisor::builder()
            .config(AppConfig::default())
            .channel(channel.clone())
            .build()
            .unwrap();
        let token = supervisor.cancellation_token();
        let (_writer, reader) = tokio::io::duplex(64);

        let handle = tokio::spawn(supervisor.run(tokio::io::BufReader::new(reader)));
        token.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap().unwrap();
        assert!(channel.deliveries().is_empty());
    }
}
