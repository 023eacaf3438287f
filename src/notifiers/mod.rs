//! # Trigger sources.
//!
//! This module provides the notifier-related types:
//! - [`Notifier`] - trait for async trigger sources
//! - [`NotifierFn`] - function-based notifier
//! - [`NotifierChan`] - channel-based notifier
//! - [`SignalNotifier`] - unix signal notifier
//! - [`NotifierRef`] - shared reference to a notifier (`Arc<dyn Notifier>`)

mod channel;
mod notifier;
mod notifier_fn;
#[cfg(unix)]
mod signal;

pub use channel::NotifierChan;
pub use notifier::{Notifier, NotifierRef};
pub use notifier_fn::NotifierFn;
#[cfg(unix)]
pub use signal::SignalNotifier;
