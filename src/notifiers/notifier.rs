//! # Trigger source abstraction.
//!
//! A [`Notifier`] tells the manager *that* a reload is needed and *why*, as an opaque
//! trigger identifier. The manager calls [`Notifier::notify`] once per cycle, in a loop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyError;

/// Shared handle to a notifier.
pub type NotifierRef = Arc<dyn Notifier>;

/// # Source of reload triggers.
///
/// `notify` may wait indefinitely. Implementations are free to ignore `ctx`:
/// the manager races every wait against cancellation on its own.
///
/// Returning an error stops [`Manager::run`](crate::Manager::run).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use reloadvisor::{Notifier, NotifyError};
///
/// struct Once;
///
/// #[async_trait]
/// impl Notifier for Once {
///     async fn notify(&self, ctx: CancellationToken) -> Result<String, NotifyError> {
///         ctx.cancelled().await;
///         Err(NotifyError::Closed)
///     }
/// }
/// ```
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Waits for the next trigger and returns its identifier.
    async fn notify(&self, ctx: CancellationToken) -> Result<String, NotifyError>;
}
