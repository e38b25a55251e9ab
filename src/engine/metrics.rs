//! Lifetime counters of the alert batcher and the stats snapshot served on
//! `/status`.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::Serialize;

/// Counters maintained by the batcher since process start.
#[derive(Debug, Default)]
pub struct BatcherMetrics {
    alerts_accepted: AtomicU64,
    alerts_rejected: AtomicU64,
    flushes: AtomicU64,
    alerts_delivered: AtomicU64,
    delivery_failures: AtomicU64,
    render_failures: AtomicU64,
}

impl BatcherMetrics {
    pub(crate) fn record_accepted(&self) {
        self.alerts_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.alerts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self, alerts: usize) {
        self.alerts_delivered.fetch_add(alerts as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_render_failure(&self) {
        self.render_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Combines the counters with the live batch state.
    pub(crate) fn snapshot(
        &self,
        pending_alerts: usize,
        next_flush_in: Option<Duration>,
    ) -> BatcherStats {
        BatcherStats {
            pending_alerts,
            next_flush_in_ms: next_flush_in.map(|d| d.as_millis() as u64),
            alerts_accepted: self.alerts_accepted.load(Ordering::Relaxed),
            alerts_rejected: self.alerts_rejected.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            alerts_delivered: self.alerts_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            render_failures: self.render_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time view of the batcher for external monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatcherStats {
    /// Alerts waiting in the current window.
    pub pending_alerts: usize,
    /// Milliseconds until the automatic flush, if a window is open.
    pub next_flush_in_ms: Option<u64>,
    /// Alerts accepted since start.
    pub alerts_accepted: u64,
    /// Alerts rejected as invalid since start.
    pub alerts_rejected: u64,
    /// Non-empty flushes since start, whatever their outcome.
    pub flushes: u64,
    /// Alerts contained in successfully delivered digests.
    pub alerts_delivered: u64,
    /// Digests the delivery channel failed to send. Their alerts are lost.
    pub delivery_failures: u64,
    /// Batches dropped because they could not be rendered.
    pub render_failures: u64,
}
