//! # Channel-backed notifier (`NotifierChan`)
//!
//! Each [`Notifier::notify`] call receives exactly one identifier from a
//! [`tokio::sync::mpsc`] channel. The token is ignored; the manager makes the
//! wait cancellable.
//!
//! The receiver is reused for every cycle, so the senders must stay alive for as
//! long as the manager runs. Once every sender is dropped, `notify` returns
//! [`NotifyError::Closed`] and the run loop stops.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::notifiers::notifier::Notifier;

/// Notifier reading trigger identifiers from a channel.
///
/// # Example
/// ```
/// use tokio::sync::mpsc;
/// use reloadvisor::{NotifierChan, NotifierRef};
///
/// let (tx, rx) = mpsc::channel::<String>(8);
/// let n: NotifierRef = NotifierChan::arc(rx);
/// # let _ = (tx, n);
/// ```
pub struct NotifierChan {
    rx: Mutex<mpsc::Receiver<String>>,
}

impl NotifierChan {
    /// Wraps the receiving half of a trigger channel.
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx: Mutex::new(rx) }
    }

    /// Wraps the receiver and returns a shared handle.
    pub fn arc(rx: mpsc::Receiver<String>) -> Arc<Self> {
        Arc::new(Self::new(rx))
    }
}

impl From<mpsc::Receiver<String>> for NotifierChan {
    fn from(rx: mpsc::Receiver<String>) -> Self {
        Self::new(rx)
    }
}

#[async_trait]
impl Notifier for NotifierChan {
    async fn notify(&self, _ctx: CancellationToken) -> Result<String, NotifyError> {
        self.rx.lock().await.recv().await.ok_or(NotifyError::Closed)
    }
}
