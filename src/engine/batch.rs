//! The in-memory batch of alerts collected during one window.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::models::Alert;

/// Handle to the flush scheduled for a window.
#[derive(Debug)]
pub(crate) struct PendingFlush {
    /// When the timer fires.
    pub deadline: DateTime<Utc>,
    /// Cancels the timer task.
    pub cancel: CancellationToken,
}

/// Alerts collected in the current window.
///
/// Invariant: `pending_flush` is `Some` exactly when `alerts` is non-empty.
/// A flush takes the whole batch with `std::mem::take`, leaving an empty one
/// behind.
#[derive(Debug, Default)]
pub(crate) struct Batch {
    /// Identity of the window; `0` while the batch is empty.
    pub window_id: u64,
    /// Alerts in arrival order.
    pub alerts: Vec<Alert>,
    /// Receive time of the alert that opened the window.
    pub window_started_at: Option<DateTime<Utc>>,
    /// The scheduled flush for this window.
    pub pending_flush: Option<PendingFlush>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Opens a new window starting at `now` and returns its cancellation token.
    pub fn open(
        &mut self,
        window_id: u64,
        now: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> CancellationToken {
        let cancel = CancellationToken::new();
        self.window_id = window_id;
        self.window_started_at = Some(now);
        self.pending_flush = Some(PendingFlush { deadline, cancel: cancel.clone() });
        cancel
    }

    /// Cancels the scheduled timer, if any. Safe to call more than once.
    pub fn cancel_timer(&self) {
        if let Some(pending) = &self.pending_flush {
            pending.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_is_empty_without_timer() {
        let batch = Batch::default();
        assert!(batch.is_empty());
        assert!(batch.pending_flush.is_none());
        assert!(batch.window_started_at.is_none());
    }

    #[test]
    fn test_open_and_cancel() {
        let now = Utc::now();
        let mut batch = Batch::default();
        let token = batch.open(3, now, now + chrono::Duration::seconds(30));
        assert_eq!(batch.window_id, 3);
        assert_eq!(batch.window_started_at, Some(now));
        assert!(!token.is_cancelled());

        batch.cancel_timer();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_take_leaves_fresh_batch() {
        let now = Utc::now();
        let mut batch = Batch::default();
        batch.open(1, now, now);
        let detached = std::mem::take(&mut batch);
        assert_eq!(detached.window_id, 1);
        assert!(batch.pending_flush.is_none());
        assert_eq!(batch.window_id, 0);
    }
}
