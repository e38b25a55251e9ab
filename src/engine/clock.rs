//! Time source used by the alert batcher.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A source of wall time and delayed wake-ups.
///
/// The batcher never reads the system clock directly; tests substitute a
/// manually driven implementation.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Completes once `now()` has reached `deadline`.
    async fn sleep_until(&self, deadline: DateTime<Utc>);
}

/// The real clock, backed by `chrono` and the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        if let Ok(remaining) = (deadline - Utc::now()).to_std() {
            tokio::time::sleep(remaining).await;
        }
    }
}
