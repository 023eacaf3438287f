//! # Delivery of manager events to subscribers.
//!
//! Every subscriber owns a *lane*: a bounded queue drained by one worker task.
//! The manager's listener feeds all lanes through [`SubscriberSet::emit`]; a
//! reload cycle never waits on a subscriber.
//!
//! ```text
//! Bus ──► listener ──► emit(ev) ──try_send──► lane "audit" ──► worker ──► on_event
//!                                └──────────► lane "log"   ──► worker ──► on_event
//!                                                                 │ panic
//!                       Bus ◄──── SubscriberPanicked ─────────────┘
//! ```
//!
//! ## Feedback rules
//! Subscriber events (`SubscriberOverflow`, `SubscriberPanicked`) travel the same bus as
//! reload events and come back through `emit`. To keep that loop finite:
//! - a subscriber event is never queued on the lane of the subscriber it names;
//! - a full or closed lane drops subscriber events without reporting them;
//! - a panic while handling a subscriber event is not reported.
//!
//! Each reload event thus causes at most one follow-up event per subscriber.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinSet;

use crate::error::panic_message;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Sending half of one subscriber's queue.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

impl Lane {
    /// Queues `ev` without waiting; the error is the overflow reason.
    fn offer(&self, ev: &Arc<Event>) -> Result<(), &'static str> {
        self.tx.try_send(Arc::clone(ev)).map_err(|err| match err {
            TrySendError::Full(_) => "full",
            TrySendError::Closed(_) => "closed",
        })
    }

    fn is_origin_of(&self, ev: &Event) -> bool {
        ev.subscriber == Some(self.name)
    }
}

/// Subscribers of one manager, each behind its own lane and worker.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: JoinSet<()>,
    bus: Bus,
}

impl SubscriberSet {
    /// Opens a lane per subscriber and spawns its worker.
    ///
    /// Must be called inside a tokio runtime unless `subs` is empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = JoinSet::new();

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                tx,
            });
            workers.spawn(drain_lane(sub, rx, bus.clone()));
        }
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// True when no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Queues `event` on every lane except the one it originates from.
    ///
    /// Never waits. A reload event that does not fit in a lane is dropped for that
    /// subscriber and reported as `SubscriberOverflow`.
    pub fn emit(&self, event: Event) {
        let event = Arc::new(event);

        for lane in &self.lanes {
            if lane.is_origin_of(&event) {
                continue;
            }
            if let Err(reason) = lane.offer(&event) {
                if !event.is_from_subscriber() {
                    self.bus
                        .publish(Event::subscriber_overflow(lane.name, reason));
                }
            }
        }
    }

    /// Closes every lane and waits until each worker handled what was already queued.
    pub async fn shutdown(self) {
        let Self {
            lanes, mut workers, ..
        } = self;
        drop(lanes);
        while workers.join_next().await.is_some() {}
    }
}

/// Worker of one lane: hands queued events to `sub` in FIFO order until the lane closes.
///
/// Panics are caught with `AssertUnwindSafe`, so state a subscriber guards with a lock
/// may be left half-updated after a panic.
async fn drain_lane(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(payload) = handled {
            if !ev.is_from_subscriber() {
                bus.publish(Event::subscriber_panicked(sub.name(), panic_message(payload)));
            }
        }
    }
}
