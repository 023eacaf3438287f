//! # Function-backed notifier (`NotifierFn`)
//!
//! [`NotifierFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a fresh
//! future per wait.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use reloadvisor::{NotifierFn, NotifierRef, NotifyError};
//!
//! // Periodic trigger.
//! let n: NotifierRef = NotifierFn::arc(|ctx: CancellationToken| async move {
//!     tokio::select! {
//!         _ = tokio::time::sleep(Duration::from_secs(30)) => Ok("tick".to_string()),
//!         _ = ctx.cancelled() => Err(NotifyError::Closed),
//!     }
//! });
//! # let _ = n;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;
use crate::notifiers::notifier::Notifier;

/// Function-backed notifier implementation.
pub struct NotifierFn<F> {
    f: F,
}

impl<F> NotifierFn<F> {
    /// Creates a new function-backed notifier.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the notifier and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Notifier for NotifierFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, NotifyError>> + Send + 'static,
{
    async fn notify(&self, ctx: CancellationToken) -> Result<String, NotifyError> {
        (self.f)(ctx).await
    }
}
