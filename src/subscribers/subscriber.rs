//! # Observing reload cycles.
//!
//! A [`Subscribe`] implementation sees every event the manager publishes: run start
//! and stop, each trigger, each priority group and the outcome of every reloader.
//! Typical uses are audit logs, reload counters and alerting on `ReloaderFailed`.
//!
//! Delivery happens on the subscriber's own worker (see [`SubscriberSet`]), so a slow
//! or panicking subscriber never delays a reload.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use reloadvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct ReloadCounter {
//!     completed: AtomicU64,
//!     failed: AtomicU64,
//! }
//!
//! #[async_trait]
//! impl Subscribe for ReloadCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         match ev.kind {
//!             EventKind::CycleCompleted => { self.completed.fetch_add(1, Ordering::Relaxed); }
//!             EventKind::ReloaderFailed => { self.failed.fetch_add(1, Ordering::Relaxed); }
//!             _ => {}
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "reload-counter" }
//! }
//! ```
//!
//! [`SubscriberSet`]: crate::SubscriberSet

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of manager events.
///
/// `on_event` runs sequentially per subscriber, in publication order.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow` / `SubscriberPanicked` events.
    ///
    /// Subscribers sharing a name are treated as the same origin, so give each a distinct one.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events that may wait for this subscriber before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
