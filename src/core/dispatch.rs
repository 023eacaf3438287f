//! # Dispatch one trigger to every priority group.
//!
//! ## Flow
//! ```text
//! groups (ascending priority)
//!   │
//!   ├─► publish GroupStarting
//!   ├─► run_group(): spawn every reloader of the group on a JoinSet
//!   │       │           (optional semaphore caps in-flight reloads)
//!   │       ▼
//!   │   join all ──► publish ReloaderSucceeded / ReloaderFailed per reloader
//!   │       │
//!   │       ├─ no failure    ──► next group
//!   │       └─ first failure ──► stop, RunError::Reload
//!   ▼
//! Ok(())
//! ```
//!
//! ## Rules
//! - A group never starts before the previous one fully joined.
//! - Every reloader of a started group runs to completion, even after a sibling failed.
//! - The reported failure is the first one observed by the join loop.
//! - A panicking reloader is caught (`catch_unwind`) and reported as [`ReloadError::Panicked`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::registry::PriorityGroup;
use crate::error::{ReloadError, RunError, panic_message};
use crate::events::{Bus, Event, EventKind};

/// First failure observed inside a group.
struct GroupFailure {
    reloader: String,
    error: ReloadError,
}

/// Runs `groups` in order for one trigger, stopping at the first failing group.
pub(crate) async fn dispatch(
    groups: Vec<PriorityGroup>,
    ctx: &CancellationToken,
    trigger: &Arc<str>,
    bus: &Bus,
    limit: Option<usize>,
) -> Result<(), RunError> {
    for group in groups {
        bus.publish(
            Event::new(EventKind::GroupStarting)
                .with_trigger(Arc::clone(trigger))
                .with_priority(group.priority)
                .with_group_size(group.reloaders.len()),
        );

        if let Some(failure) = run_group(&group, ctx, trigger, bus, limit).await {
            return Err(RunError::Reload {
                priority: group.priority,
                reloader: failure.reloader,
                trigger: trigger.to_string(),
                source: failure.error,
            });
        }
    }
    Ok(())
}

/// Runs all reloaders of one group concurrently and waits for every one of them.
async fn run_group(
    group: &PriorityGroup,
    ctx: &CancellationToken,
    trigger: &Arc<str>,
    bus: &Bus,
    limit: Option<usize>,
) -> Option<GroupFailure> {
    let semaphore = limit.map(|n| Arc::new(Semaphore::new(n)));
    let mut set = JoinSet::new();

    for reloader in &group.reloaders {
        let reloader = Arc::clone(reloader);
        let ctx = ctx.clone();
        let trigger = Arc::clone(trigger);
        let semaphore = semaphore.clone();

        set.spawn(async move {
            let _permit = match semaphore {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            let fut = reloader.reload(ctx, &trigger);
            let res = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res,
                Err(panic_err) => Err(ReloadError::Panicked {
                    info: panic_message(panic_err),
                }),
            };
            (reloader.name().to_string(), res)
        });
    }

    let mut failure: Option<GroupFailure> = None;
    while let Some(joined) = set.join_next().await {
        // Only runtime shutdown can cancel a group task.
        let (name, res) = joined.unwrap_or_else(|_| (String::new(), Err(ReloadError::Canceled)));

        match res {
            Ok(()) => bus.publish(
                Event::new(EventKind::ReloaderSucceeded)
                    .with_trigger(Arc::clone(trigger))
                    .with_priority(group.priority)
                    .with_reloader(name.as_str()),
            ),
            Err(error) => {
                bus.publish(
                    Event::new(EventKind::ReloaderFailed)
                        .with_trigger(Arc::clone(trigger))
                        .with_priority(group.priority)
                        .with_reloader(name.as_str())
                        .with_reason(error.to_string()),
                );
                if failure.is_none() {
                    failure = Some(GroupFailure {
                        reloader: name,
                        error,
                    });
                }
            }
        }
    }
    failure
}
