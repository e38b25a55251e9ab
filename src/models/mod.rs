//! This module contains the data models for the alert digest engine.

pub mod alert;
pub mod notification;
pub mod severity;

pub use alert::{Alert, AlertError, AlertId, AlertInput, AlertType, DisplayValue, NewAlert};
pub use notification::{Digest, DigestEntry, DigestSection, Notification, SeverityCount};
pub use severity::{Severity, SeverityInfo};
