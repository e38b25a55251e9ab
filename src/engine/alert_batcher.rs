//! Alert batching module
//!
//! The `AlertBatcher` collects alerts into fixed windows and delivers one
//! digest per window. A window opens with the first alert added to an empty
//! batch and is never extended by later arrivals.
//!
//! The current batch lives behind a mutex. The window timer and
//! [`AlertBatcher::force_flush`] run the same sequence: take the flush lock,
//! detach the batch under the batch lock, release it, then group, render and
//! deliver the detached snapshot. Alerts added while a digest is being
//! delivered therefore land in a fresh window, and no two flushes ever run at
//! the same time.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    channels::DeliveryChannel,
    config::AppConfig,
    engine::{
        batch::Batch,
        clock::Clock,
        grouper::group_by_severity,
        metrics::{BatcherMetrics, BatcherStats},
    },
    models::{Alert, AlertError, AlertId, AlertInput},
    notification::DigestRenderer,
};

/// What triggered a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The window timer expired.
    Timer,
    /// An operator, a test or shutdown asked for it.
    Forced,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushReason::Timer => f.write_str("timer"),
            FlushReason::Forced => f.write_str("forced"),
        }
    }
}

/// Tunables of the batcher.
#[derive(Debug, Clone)]
pub struct BatcherSettings {
    /// Length of the collection window.
    pub window: Duration,
    /// Destination used when no alert in a batch names one.
    pub default_notify_target: Option<String>,
}

impl From<&AppConfig> for BatcherSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            window: config.batch_window,
            default_notify_target: config.default_notify_target.clone(),
        }
    }
}

/// Distinct explicit notify targets in arrival order, or the default target
/// when no alert named one.
pub fn resolve_recipients(alerts: &[Alert], default_notify_target: Option<&str>) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    for target in alerts.iter().filter_map(|a| a.notify_target.as_ref()) {
        if !recipients.contains(target) {
            recipients.push(target.clone());
        }
    }
    if recipients.is_empty() {
        recipients.extend(default_notify_target.map(str::to_string));
    }
    recipients
}

/// State shared between the public handle and the timer tasks.
struct Shared {
    window: TimeDelta,
    default_notify_target: Option<String>,
    clock: Arc<dyn Clock>,
    channel: Arc<dyn DeliveryChannel>,
    renderer: DigestRenderer,
    /// The current batch.
    batch: Mutex<Batch>,
    /// Held for the whole of a flush.
    flush_lock: Mutex<()>,
    next_alert_id: AtomicU64,
    next_window_id: AtomicU64,
    metrics: BatcherMetrics,
}

/// Collects alerts and delivers one consolidated digest per window.
///
/// Cloning is cheap; clones share the same batch.
#[derive(Clone)]
pub struct AlertBatcher {
    shared: Arc<Shared>,
}

impl AlertBatcher {
    /// Creates a new AlertBatcher instance
    pub fn new(
        settings: BatcherSettings,
        clock: Arc<dyn Clock>,
        channel: Arc<dyn DeliveryChannel>,
        renderer: DigestRenderer,
    ) -> Self {
        let window = TimeDelta::from_std(settings.window).unwrap_or(TimeDelta::MAX);
        Self {
            shared: Arc::new(Shared {
                window,
                default_notify_target: settings.default_notify_target,
                clock,
                channel,
                renderer,
                batch: Mutex::new(Batch::default()),
                flush_lock: Mutex::new(()),
                next_alert_id: AtomicU64::new(0),
                next_window_id: AtomicU64::new(0),
                metrics: BatcherMetrics::default(),
            }),
        }
    }

    /// Validates an alert and adds it to the current window, opening a new
    /// window (and scheduling its flush) when the batch is empty.
    pub async fn add_alert(&self, input: AlertInput) -> Result<AlertId, AlertError> {
        let new_alert = match input.validate() {
            Ok(alert) => alert,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected invalid alert.");
                self.shared.metrics.record_rejected();
                return Err(e);
            }
        };

        let mut batch = self.shared.batch.lock().await;
        let now = self.shared.clock.now();
        let id = AlertId(self.shared.next_alert_id.fetch_add(1, Ordering::Relaxed) + 1);
        let alert = new_alert.stamp(id, now);

        if batch.is_empty() {
            let window_id = self.shared.next_window_id.fetch_add(1, Ordering::Relaxed) + 1;
            let deadline =
                now.checked_add_signed(self.shared.window).unwrap_or(DateTime::<Utc>::MAX_UTC);
            let cancel = batch.open(window_id, now, deadline);
            self.spawn_timer(window_id, deadline, cancel);
            tracing::info!(window_id, %deadline, "Opened new alert window.");
        }

        tracing::debug!(
            alert_id = %alert.id,
            host = %alert.host_name,
            severity = %alert.severity,
            window_id = batch.window_id,
            "Alert added to batch."
        );
        batch.alerts.push(alert);
        self.shared.metrics.record_accepted();

        Ok(id)
    }

    fn spawn_timer(&self, window_id: u64, deadline: DateTime<Utc>, cancel: CancellationToken) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(window_id, "Flush timer cancelled.");
                }
                _ = shared.clock.sleep_until(deadline) => {
                    tracing::debug!(window_id, "Flush timer fired.");
                    shared.flush(FlushReason::Timer, Some(window_id)).await;
                }
            }
        });
    }

    /// Flushes the current batch immediately. Returns `false` when there was
    /// nothing to flush.
    pub async fn force_flush(&self) -> bool {
        self.shared.flush(FlushReason::Forced, None).await
    }

    /// Number of alerts waiting in the current window.
    pub async fn pending_count(&self) -> usize {
        self.shared.batch.lock().await.alerts.len()
    }

    /// Returns the live batch state together with the lifetime counters.
    pub async fn stats(&self) -> BatcherStats {
        let batch = self.shared.batch.lock().await;
        let now = self.shared.clock.now();
        let next_flush_in = batch
            .pending_flush
            .as_ref()
            .map(|pending| (pending.deadline - now).to_std().unwrap_or(Duration::ZERO));
        self.shared.metrics.snapshot(batch.alerts.len(), next_flush_in)
    }

    /// Shuts down the batcher, flushing any pending alerts.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down alert batcher...");
        if self.force_flush().await {
            tracing::info!("Pending alerts flushed on shutdown.");
        } else {
            tracing::info!("No pending alerts to flush on shutdown.");
        }
    }
}

impl Shared {
    /// Detaches the current batch and delivers it. A timer passes the window
    /// it was scheduled for and only flushes that window.
    async fn flush(&self, reason: FlushReason, expected_window: Option<u64>) -> bool {
        let _in_flight = self.flush_lock.lock().await;

        let detached = {
            let mut batch = self.batch.lock().await;
            if batch.is_empty() {
                tracing::debug!(%reason, "Flush requested on empty batch.");
                return false;
            }
            if let Some(expected) = expected_window {
                if batch.window_id != expected {
                    tracing::debug!(
                        expected,
                        current = batch.window_id,
                        "Ignoring timer for a window that was already flushed."
                    );
                    return false;
                }
            }
            batch.cancel_timer();
            std::mem::take(&mut *batch)
        };

        self.deliver(detached, reason).await;
        true
    }

    async fn deliver(&self, batch: Batch, reason: FlushReason) {
        let Batch { window_id, alerts, window_started_at, .. } = batch;
        let now = self.clock.now();
        let window_elapsed_ms =
            window_started_at.map(|started| (now - started).num_milliseconds()).unwrap_or(0);
        let alert_count = alerts.len();
        self.metrics.record_flush();

        let groups = group_by_severity(&alerts);
        let recipients = resolve_recipients(&alerts, self.default_notify_target.as_deref());
        let notification = match self.renderer.render(&groups, recipients, now) {
            Ok(notification) => notification,
            Err(e) => {
                tracing::error!(
                    window_id,
                    %reason,
                    alert_count,
                    error = %e,
                    "Failed to render alert digest. Batch dropped."
                );
                self.metrics.record_render_failure();
                return;
            }
        };

        match self.channel.send(&notification).await {
            Ok(()) => {
                tracing::info!(
                    window_id,
                    %reason,
                    alert_count,
                    window_elapsed_ms,
                    channel = self.channel.name(),
                    "Delivered alert digest."
                );
                self.metrics.record_delivered(alert_count);
            }
            Err(e) => {
                let snapshot = serde_json::to_string(&alerts)
                    .unwrap_or_else(|se| format!("<failed to serialize snapshot: {se}>"));
                tracing::error!(
                    window_id,
                    %reason,
                    alert_count,
                    channel = self.channel.name(),
                    error = %e,
                    snapshot = %snapshot,
                    "Failed to deliver alert digest. Batch dropped without retry."
                );
                self.metrics.record_delivery_failure();
            }
        }
    }
}
