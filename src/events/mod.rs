//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the manager loop, the group
//! dispatcher and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Manager::run`, `core::dispatch`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the manager's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained from `Manager::events()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
