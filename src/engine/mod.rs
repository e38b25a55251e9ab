//! The alert engine collects incoming alerts into fixed windows, groups each
//! window by severity and hands the rendered digest to a delivery channel.

pub mod alert_batcher;
mod batch;
pub mod clock;
pub mod grouper;
pub mod metrics;

pub use alert_batcher::{AlertBatcher, BatcherSettings, FlushReason, resolve_recipients};
pub use clock::{Clock, SystemClock};
pub use grouper::{SeverityGroup, group_by_severity};
pub use metrics::{BatcherMetrics, BatcherStats};
