//! Runtime core: registry, dispatch and the run loop.
//!
//! The public API from this module is [`Manager`] and its [`ManagerBuilder`].
//!
//! Internal modules:
//! - [`registry`]: append-only prioritized reloader list, grouped per cycle;
//! - [`dispatch`]: runs priority groups in order for one trigger;
//! - [`manager`]: trigger wait, cancellation race and event publishing;
//! - [`builder`]: one-shot construction with subscribers.

mod builder;
mod dispatch;
mod manager;
mod registry;

pub use builder::ManagerBuilder;
pub use manager::Manager;
