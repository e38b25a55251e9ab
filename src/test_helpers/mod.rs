//! A set of helpers for testing

mod alert;
mod channel;
mod clock;

pub use alert::{AlertInputBuilder, sample_notification};
pub use channel::RecordingChannel;
pub use clock::{ManualClock, settle};
