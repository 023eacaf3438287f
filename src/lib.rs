//! # reloadvisor
//!
//! **Reloadvisor** coordinates the reload of dependent resources (configuration,
//! caches, connection pools) whenever an external trigger fires.
//!
//! It separates *what can trigger a reload* (a [`Notifier`]) from *what gets
//! reloaded and in which order* (prioritized [`Reloader`]s), and runs both inside
//! a cancellable loop owned by the [`Manager`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐        ┌──────────────────────────────────────────────┐
//!   │   Notifier   │        │  Manager                                     │
//!   │ (fn/chan/sig)│──id──► │  - Registry (priority → reloaders)           │
//!   └──────────────┘        │  - Bus (broadcast events)                    │
//!                           │  - SubscriberSet (fans out to subscribers)   │
//!                           └───────┬──────────────────────────────────────┘
//!                                   ▼
//!        priority -3          priority 0               priority 10
//!   ┌──────────────┐   ┌──────────────┬──────────────┐   ┌──────────────┐
//!   │  Reloader A  │──►│  Reloader B  │  Reloader C  │──►│  Reloader D  │
//!   └──────────────┘   └──────────────┴──────────────┘   └──────────────┘
//!     group 1            group 2 (concurrent)              group 3
//! ```
//!
//! ### Lifecycle
//! ```text
//! Manager::run(ctx)
//!
//! loop {
//!   ├─► spawn notifier.notify(ctx), race against ctx.cancelled()
//!   │       ├─ cancelled ──► abort wait, return Ok(())
//!   │       ├─ Err(e)    ──► return Err(RunError::Notify)
//!   │       └─ Ok(id)    ──► publish TriggerReceived
//!   │
//!   ├─► for group in registry.groups()   (ascending priority)
//!   │       ├─ publish GroupStarting
//!   │       ├─ run every reloader of the group concurrently, join all
//!   │       └─ any failed ──► return Err(RunError::Reload)   (later groups skipped)
//!   │
//!   └─► publish CycleCompleted
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Manager**       | Trigger wait, prioritized dispatch, cancellation.            | [`Manager`], [`ManagerBuilder`]             |
//! | **Notifiers**     | Trigger sources from functions, channels or unix signals.    | [`Notifier`], [`NotifierFn`], [`NotifierChan`] |
//! | **Reloaders**     | Reload handlers as trait objects or closures.                | [`Reloader`], [`ReloaderFn`]                |
//! | **Subscriber API**| Hook into reload events (logging, metrics, alerts).          | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Errors**        | Typed errors distinguishing notifier and reload failures.    | [`RunError`], [`NotifyError`], [`ReloadError`] |
//! | **Configuration** | Event bus sizing and per-group concurrency limit.            | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use reloadvisor::{Config, Manager, NotifierFn, NotifyError, ReloadError, ReloaderFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Manager::builder(Config::default())
//!         // fires every 10ms until cancelled
//!         .with_notifier(NotifierFn::arc(|ctx: CancellationToken| async move {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             if ctx.is_cancelled() {
//!                 return Err(NotifyError::Closed);
//!             }
//!             Ok("settings.toml".to_string())
//!         }))
//!         .with_reloader(0, ReloaderFn::arc("settings", |_ctx: CancellationToken, id: String| async move {
//!             println!("reloading settings after {id}");
//!             Ok::<_, ReloadError>(())
//!         }))
//!         .with_reloader(10, ReloaderFn::arc("http-routes", |_ctx: CancellationToken, _id: String| async {
//!             Ok::<_, ReloadError>(())
//!         }))
//!         .build();
//!
//!     let ctx = CancellationToken::new();
//!     let stop = ctx.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(15)).await;
//!         stop.cancel();
//!     });
//!
//!     manager.run(ctx).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod notifiers;
mod reloaders;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{Manager, ManagerBuilder};
pub use error::{NotifyError, ReloadError, RunError};
pub use events::{Bus, Event, EventKind};
#[cfg(unix)]
pub use notifiers::SignalNotifier;
pub use notifiers::{Notifier, NotifierChan, NotifierFn, NotifierRef};
pub use reloaders::{Reloader, ReloaderFn, ReloaderRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in `tracing` subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
