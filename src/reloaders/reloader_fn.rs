//! # Function-backed reloader (`ReloaderFn`)
//!
//! [`ReloaderFn`] wraps a closure `F: Fn(CancellationToken, String) -> Fut`, producing a
//! fresh future per reload. There is no hidden state between cycles; if shared state is
//! needed, capture an `Arc<...>` explicitly in the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use reloadvisor::{ReloadError, ReloaderFn, ReloaderRef};
//!
//! let r: ReloaderRef = ReloaderFn::arc("routes", |_ctx: CancellationToken, id: String| async move {
//!     if id.is_empty() {
//!         return Err(ReloadError::fail("empty trigger"));
//!     }
//!     Ok(())
//! });
//!
//! assert_eq!(r.name(), "routes");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ReloadError;
use crate::reloaders::reloader::Reloader;

/// Function-backed reloader implementation.
pub struct ReloaderFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ReloaderFn<F> {
    /// Creates a new function-backed reloader.
    ///
    /// Prefer [`ReloaderFn::arc`] when you immediately need a [`ReloaderRef`](crate::ReloaderRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the reloader and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Reloader for ReloaderFn<F>
where
    F: Fn(CancellationToken, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ReloadError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn reload(&self, ctx: CancellationToken, id: &str) -> Result<(), ReloadError> {
        (self.f)(ctx, id.to_owned()).await
    }
}
