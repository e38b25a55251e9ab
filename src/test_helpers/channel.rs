use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use crate::{
    channels::{DeliveryChannel, DeliveryError},
    models::Notification,
};

/// A delivery channel that records what it was asked to send.
///
/// It can be told to fail, and it can be gated so that `send` blocks until
/// the test releases it.
pub struct RecordingChannel {
    sent: Mutex<Vec<Notification>>,
    tx: mpsc::UnboundedSender<Notification>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Notification>>,
    fail: AtomicBool,
    gate: Option<Arc<Notify>>,
    entered: Arc<Notify>,
}

impl RecordingChannel {
    /// Creates a channel that accepts every notification.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sent: Mutex::new(Vec::new()),
            tx,
            rx: tokio::sync::Mutex::new(rx),
            fail: AtomicBool::new(false),
            gate: None,
            entered: Arc::new(Notify::new()),
        }
    }

    /// Creates a channel whose `send` waits for [`RecordingChannel::release`].
    pub fn gated() -> Self {
        Self { gate: Some(Arc::new(Notify::new())), ..Self::new() }
    }

    /// Makes subsequent sends fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Lets one blocked `send` continue.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Completes once a `send` call has started.
    pub async fn wait_for_send_started(&self) {
        self.entered.notified().await;
    }

    /// Waits up to a second for the next successfully delivered notification.
    pub async fn next_delivery(&self) -> Option<Notification> {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.ok().flatten()
    }

    /// Everything delivered so far.
    pub fn deliveries(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::NotifyFailed("recording channel set to fail".into()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        let _ = self.tx.send(notification.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
