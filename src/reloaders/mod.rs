//! # Reload handlers.
//!
//! - [`Reloader`] - trait for async reload handlers
//! - [`ReloaderFn`] - function-based reloader
//! - [`ReloaderRef`] - shared reference to a reloader (`Arc<dyn Reloader>`)

mod reloader;
mod reloader_fn;

pub use reloader::{Reloader, ReloaderRef};
pub use reloader_fn::ReloaderFn;
