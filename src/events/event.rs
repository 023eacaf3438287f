//! # Runtime events emitted by the reload manager.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: lifecycle of one [`Manager::run`](crate::Manager::run) call
//! - **Cycle events**: trigger received, priority groups, per-reloader outcome
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, trigger id,
//! priority, reloader name and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use reloadvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ReloaderFailed)
//!     .with_trigger("config.toml")
//!     .with_priority(10)
//!     .with_reloader("cache")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::ReloaderFailed);
//! assert_eq!(ev.trigger.as_deref(), Some("config.toml"));
//! assert_eq!(ev.priority, Some(10));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Run events ===
    /// `run` entered the loop with a notifier in place.
    RunStarting,

    /// `run` returned `Ok(())` after cancellation.
    RunStopped,

    /// `run` returned an error.
    ///
    /// Sets:
    /// - `reason`: error message
    RunFailed,

    // === Cycle events ===
    /// Notifier produced a trigger identifier; dispatch begins.
    ///
    /// Sets:
    /// - `trigger`: trigger identifier
    TriggerReceived,

    /// Notifier reported an error instead of a trigger.
    ///
    /// Sets:
    /// - `reason`: error message
    NotifierFailed,

    /// A priority group is about to run.
    ///
    /// Sets:
    /// - `trigger`: trigger identifier
    /// - `priority`: group priority
    /// - `group_size`: number of reloaders in the group
    GroupStarting,

    /// One reloader of the current group succeeded.
    ///
    /// Sets:
    /// - `trigger`, `priority`, `reloader`
    ReloaderSucceeded,

    /// One reloader of the current group failed.
    ///
    /// Sets:
    /// - `trigger`, `priority`, `reloader`
    /// - `reason`: failure message
    ReloaderFailed,

    /// Every group succeeded for this trigger; the manager waits again.
    ///
    /// Sets:
    /// - `trigger`: trigger identifier
    CycleCompleted,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Trigger identifier of the current cycle.
    pub trigger: Option<Arc<str>>,
    /// Priority group the event belongs to.
    pub priority: Option<i64>,
    /// Reloader name, only for reloader outcome events.
    pub reloader: Option<Arc<str>>,
    /// Subscriber the event originates from; `Some` only for subscriber events.
    pub subscriber: Option<&'static str>,
    /// Number of reloaders in the group.
    pub group_size: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            trigger: None,
            priority: None,
            reloader: None,
            subscriber: None,
            group_size: None,
            reason: None,
        }
    }

    /// Attaches a trigger identifier.
    #[inline]
    pub fn with_trigger(mut self, trigger: impl Into<Arc<str>>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// Attaches a group priority.
    #[inline]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches a reloader name.
    #[inline]
    pub fn with_reloader(mut self, reloader: impl Into<Arc<str>>) -> Self {
        self.reloader = Some(reloader.into());
        self
    }

    /// Marks the event as raised on behalf of `subscriber`.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: &'static str) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    /// True for events produced by the subscriber layer itself.
    #[inline]
    pub fn is_from_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }

    /// Attaches the size of a priority group.
    #[inline]
    pub fn with_group_size(mut self, n: usize) -> Self {
        self.group_size = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }
}
