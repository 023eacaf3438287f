//! # LogWriter: events rendered through `tracing`
//!
//! A minimal subscriber that turns incoming [`Event`]s into `tracing` records
//! with structured fields. Install any `tracing` subscriber to see them.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  reloadvisor: run starting
//! INFO  reloadvisor: trigger received trigger="config.toml"
//! DEBUG reloadvisor: group starting trigger="config.toml" priority=0 group_size=2
//! WARN  reloadvisor: reloader failed trigger="config.toml" priority=10 reloader="cache" reason="reload failed: boom"
//! WARN  reloadvisor: run failed reason="..."
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let trigger = e.trigger.as_deref().unwrap_or("");
        let reloader = e.reloader.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        let subscriber = e.subscriber.unwrap_or("");

        match e.kind {
            EventKind::RunStarting => info!(seq = e.seq, "run starting"),
            EventKind::RunStopped => info!(seq = e.seq, "run stopped"),
            EventKind::RunFailed => warn!(seq = e.seq, reason, "run failed"),
            EventKind::TriggerReceived => info!(seq = e.seq, trigger, "trigger received"),
            EventKind::NotifierFailed => warn!(seq = e.seq, reason, "notifier failed"),
            EventKind::GroupStarting => debug!(
                seq = e.seq,
                trigger,
                priority = e.priority,
                group_size = e.group_size,
                "group starting"
            ),
            EventKind::ReloaderSucceeded => debug!(
                seq = e.seq,
                trigger,
                priority = e.priority,
                reloader,
                "reloader succeeded"
            ),
            EventKind::ReloaderFailed => warn!(
                seq = e.seq,
                trigger,
                priority = e.priority,
                reloader,
                reason,
                "reloader failed"
            ),
            EventKind::CycleCompleted => info!(seq = e.seq, trigger, "cycle completed"),
            EventKind::SubscriberOverflow => {
                warn!(subscriber, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                warn!(subscriber, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
