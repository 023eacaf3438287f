//! # OS signal notifier (unix).
//!
//! [`SignalNotifier`] yields a fixed trigger identifier every time the process
//! receives a given signal. The classic use is reloading configuration on `SIGHUP`.
//!
//! The listener is registered on construction, so signals delivered between two
//! cycles are not lost (tokio coalesces them into one pending notification).

use std::io;

use async_trait::async_trait;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::notifiers::notifier::Notifier;

/// Notifier triggered by a unix signal.
pub struct SignalNotifier {
    signal: Mutex<Signal>,
    id: String,
}

impl SignalNotifier {
    /// Listens for `kind`; every delivery yields `id`.
    ///
    /// Must be called inside a tokio runtime. Fails if the signal handler cannot be registered.
    pub fn new(kind: SignalKind, id: impl Into<String>) -> io::Result<Self> {
        Ok(Self {
            signal: Mutex::new(signal(kind)?),
            id: id.into(),
        })
    }

    /// Listens for `SIGHUP`; every delivery yields `"SIGHUP"`.
    pub fn hangup() -> io::Result<Self> {
        Self::new(SignalKind::hangup(), "SIGHUP")
    }
}

#[async_trait]
impl Notifier for SignalNotifier {
    async fn notify(&self, _ctx: CancellationToken) -> Result<String, NotifyError> {
        match self.signal.lock().await.recv().await {
            Some(()) => Ok(self.id.clone()),
            None => Err(NotifyError::Closed),
        }
    }
}
