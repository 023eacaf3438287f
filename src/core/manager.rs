//! # Manager: waits for triggers and dispatches them to prioritized reloaders.
//!
//! The [`Manager`] owns the reloader registry, the single active notifier and the
//! event bus. Subscribers are fed by a listener task holding the [`SubscriberSet`];
//! the listener stops (and drains the subscriber queues) when the manager is dropped.
//!
//! ## State machine
//! ```text
//! run(ctx)
//!   │
//!   ├─ no notifier ─────────────────────────────► Err(NotifierMissing)
//!   ▼
//! Waiting: spawn notifier.notify(ctx) ──┐
//!          select! {                    │
//!            ctx.cancelled()  ──► abort wait ──► Ok(())              (Terminated)
//!            join handle      ──► Err(e)     ──► Err(Notify)         (Terminated)
//!                             ──► Ok(id)     ──► Dispatching
//!          }
//!   ▲
//!   │  Dispatching: registry.groups() ──► dispatch(id)
//!   │     ├─ every group Ok ──► CycleCompleted ──► Waiting
//!   └─────┘
//!         └─ first failure ──► Err(Reload)                           (Terminated)
//! ```
//!
//! ## Rules
//! - One cycle fully resolves before the next `notify` call is issued.
//! - Cancellation is observed between cycles; an in-flight dispatch runs to
//!   completion (reloaders get the same token and may stop early on their own).
//! - An abandoned wait is aborted, so a channel notifier never loses a value to a
//!   stale wait and a later `run` starts from a clean slate.
//! - The manager never retries: the first error ends `run`.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::config::Config;
use crate::core::{builder::ManagerBuilder, dispatch::dispatch, registry::Registry};
use crate::error::{NotifyError, RunError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::notifiers::NotifierRef;
use crate::reloaders::ReloaderRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Coordinates notifier waits, prioritized reload dispatch and event delivery.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio::sync::mpsc;
/// use tokio_util::sync::CancellationToken;
/// use reloadvisor::{Config, Manager, NotifierChan, ReloadError, ReloaderFn};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let (tx, rx) = mpsc::channel::<String>(1);
///
///     let mut manager = Manager::new(Config::default());
///     manager.register_notifier(NotifierChan::arc(rx));
///     manager.register_reloader(0, ReloaderFn::arc("config", |_ctx: CancellationToken, id: String| async move {
///         println!("reloading config because of {id}");
///         Ok::<_, ReloadError>(())
///     }));
///
///     let ctx = CancellationToken::new();
///     let stop = ctx.clone();
///     tokio::spawn(async move {
///         tx.send("config.toml".to_string()).await.ok();
///         tokio::time::sleep(Duration::from_millis(50)).await;
///         stop.cancel();
///     });
///
///     manager.run(ctx).await?;
///     Ok(())
/// }
/// ```
pub struct Manager {
    cfg: Config,
    bus: Bus,
    registry: Registry,
    notifier: Option<NotifierRef>,
    /// Stops the subscriber listener when the manager is dropped.
    _listener: DropGuard,
}

impl Manager {
    /// Creates an empty manager without subscribers.
    ///
    /// Does not require a running tokio runtime.
    pub fn new(cfg: Config) -> Self {
        Self::new_internal(cfg, Vec::new())
    }

    /// Returns a builder for configuring subscribers, notifier and reloaders up front.
    pub fn builder(cfg: Config) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(subscribers, bus.clone());
        let listener_token = CancellationToken::new();
        if !subs.is_empty() {
            subscriber_listener(&bus, subs, listener_token.clone());
        }

        Self {
            cfg,
            bus,
            registry: Registry::default(),
            notifier: None,
            _listener: listener_token.drop_guard(),
        }
    }

    /// Appends `reloader` to the group of `priority`.
    ///
    /// Lower priorities run first. Registering the same reloader twice yields two
    /// independent invocations per cycle.
    pub fn register_reloader(&mut self, priority: i64, reloader: ReloaderRef) {
        self.registry.push(priority, reloader);
    }

    /// Sets the active notifier, replacing any previous one.
    pub fn register_notifier(&mut self, notifier: NotifierRef) {
        self.notifier = Some(notifier);
    }

    /// Number of registered reloader entries (across all priorities).
    pub fn reloader_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the manager configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Creates a receiver observing every event published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs the wait/dispatch loop until `ctx` is cancelled or an error occurs.
    ///
    /// Returns `Ok(())` only after cancellation. The manager can be run again afterwards.
    pub async fn run(&self, ctx: CancellationToken) -> Result<(), RunError> {
        let notifier = self.notifier.clone().ok_or(RunError::NotifierMissing)?;

        self.bus.publish(Event::new(EventKind::RunStarting));
        let res = self.run_loop(&notifier, &ctx).await;
        match &res {
            Ok(()) => self.bus.publish(Event::new(EventKind::RunStopped)),
            Err(e) => self
                .bus
                .publish(Event::new(EventKind::RunFailed).with_reason(e.as_message())),
        }
        res
    }

    async fn run_loop(
        &self,
        notifier: &NotifierRef,
        ctx: &CancellationToken,
    ) -> Result<(), RunError> {
        loop {
            let trigger: Arc<str> = match wait_trigger(notifier, ctx).await {
                None => return Ok(()),
                Some(Ok(id)) => id.into(),
                Some(Err(e)) => {
                    self.bus
                        .publish(Event::new(EventKind::NotifierFailed).with_reason(e.to_string()));
                    return Err(RunError::Notify { source: e });
                }
            };

            self.bus.publish(
                Event::new(EventKind::TriggerReceived).with_trigger(Arc::clone(&trigger)),
            );
            dispatch(
                self.registry.groups(),
                ctx,
                &trigger,
                &self.bus,
                self.cfg.concurrency_limit(),
            )
            .await?;
            self.bus
                .publish(Event::new(EventKind::CycleCompleted).with_trigger(trigger));
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Waits for the next trigger, or `None` once `ctx` is cancelled.
///
/// The notifier runs on its own task so that one ignoring `ctx` cannot hold the
/// loop; on cancellation that task is aborted and its result discarded.
async fn wait_trigger(
    notifier: &NotifierRef,
    ctx: &CancellationToken,
) -> Option<Result<String, NotifyError>> {
    if ctx.is_cancelled() {
        return None;
    }

    let n = Arc::clone(notifier);
    let token = ctx.clone();
    let mut wait = tokio::spawn(async move { n.notify(token).await });

    tokio::select! {
        biased;
        _ = ctx.cancelled() => {
            wait.abort();
            None
        }
        joined = &mut wait => Some(match joined {
            Ok(res) => res,
            Err(err) if err.is_panic() => Err(NotifyError::Panicked {
                info: panic_message(err.into_panic()),
            }),
            Err(_) => Err(NotifyError::Closed),
        }),
    }
}

/// Forwards bus events to the subscriber set until `stop` is cancelled.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, stop: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        set.shutdown().await;
    });
}
