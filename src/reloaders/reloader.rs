//! # Reload handler abstraction.
//!
//! A [`Reloader`] refreshes one resource (configuration, cache, connection pool...)
//! when the manager dispatches a trigger. The common handle type is [`ReloaderRef`].
//!
//! A reloader receives the manager's [`CancellationToken`]; honoring it is optional
//! but recommended for long reloads, since the manager never aborts an in-flight one.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ReloadError;

/// Shared handle to a reloader.
pub type ReloaderRef = Arc<dyn Reloader>;

/// # Asynchronous reload handler.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use reloadvisor::{Reloader, ReloadError};
///
/// struct Cache;
///
/// #[async_trait]
/// impl Reloader for Cache {
///     fn name(&self) -> &str { "cache" }
///
///     async fn reload(&self, ctx: CancellationToken, id: &str) -> Result<(), ReloadError> {
///         if ctx.is_cancelled() {
///             return Err(ReloadError::Canceled);
///         }
///         // refresh entries affected by `id`...
///         let _ = id;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Reloader: Send + Sync + 'static {
    /// Returns a human-readable name used in errors and events.
    ///
    /// The default uses `type_name::<Self>()` - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Reloads the resource for trigger `id`.
    async fn reload(&self, ctx: CancellationToken, id: &str) -> Result<(), ReloadError>;
}
