use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reloadvisor::{
    Config, Event, EventKind, Manager, Notifier, NotifierChan, NotifierFn, NotifyError,
    ReloadError, Reloader, ReloaderFn, RunError, Subscribe,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

type Calls = Arc<Mutex<Vec<String>>>;

/// Records `name:trigger` for every call, optionally failing.
struct Probe {
    name: &'static str,
    calls: Calls,
    fail: bool,
}

impl Probe {
    fn ok(name: &'static str, calls: &Calls) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: calls.clone(),
            fail: false,
        })
    }

    fn failing(name: &'static str, calls: &Calls) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: calls.clone(),
            fail: true,
        })
    }
}

#[async_trait]
impl Reloader for Probe {
    fn name(&self) -> &str {
        self.name
    }

    async fn reload(&self, _ctx: CancellationToken, id: &str) -> Result<(), ReloadError> {
        self.calls.lock().unwrap().push(format!("{}:{id}", self.name));
        if self.fail {
            Err(ReloadError::fail(format!("{} broke", self.name)))
        } else {
            Ok(())
        }
    }
}

fn calls() -> Calls {
    Arc::new(Mutex::new(Vec::new()))
}

fn snapshot(calls: &Calls) -> Vec<String> {
    calls.lock().unwrap().clone()
}

fn spawn_run(manager: &Arc<Manager>, ctx: &CancellationToken) -> JoinHandle<Result<(), RunError>> {
    let manager = Arc::clone(manager);
    let ctx = ctx.clone();
    tokio::spawn(async move { manager.run(ctx).await })
}

async fn eventually(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn finish(handle: JoinHandle<Result<(), RunError>>) -> Result<(), RunError> {
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("run did not return in time")
        .expect("run task panicked")
}

#[tokio::test]
async fn notifier_error_ends_run_without_reloading() {
    let log = calls();
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::ok("only", &log));
    manager.register_notifier(NotifierFn::arc(|_ctx: CancellationToken| async {
        Err::<String, _>(NotifyError::fail("upstream lost"))
    }));

    let err = manager.run(CancellationToken::new()).await.unwrap_err();

    assert!(err.is_notify());
    assert!(matches!(
        err,
        RunError::Notify {
            source: NotifyError::Fail { .. }
        }
    ));
    assert!(snapshot(&log).is_empty());
}

#[tokio::test]
async fn successful_reload_keeps_running_until_cancelled() {
    let log = calls();
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::ok("only", &log));
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("test-id".to_string()).await.unwrap();

    eventually(|| snapshot(&log).len() == 1).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!handle.is_finished());

    ctx.cancel();
    finish(handle).await.unwrap();
    assert_eq!(snapshot(&log), vec!["only:test-id"]);
}

#[tokio::test]
async fn failing_reload_returns_without_cancellation() {
    let log = calls();
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::failing("only", &log));
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("test-id".to_string()).await.unwrap();

    let err = finish(handle).await.unwrap_err();
    assert!(err.is_reload());
    assert!(!ctx.is_cancelled());
}

#[tokio::test]
async fn failing_group_skips_every_later_group() {
    let log = calls();
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(10, Probe::failing("p10", &log));
    manager.register_reloader(4, Probe::ok("p4", &log));
    manager.register_reloader(25, Probe::ok("p25a", &log));
    manager.register_reloader(20, Probe::ok("p20", &log));
    manager.register_reloader(25, Probe::ok("p25b", &log));
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let handle = spawn_run(&manager, &CancellationToken::new());
    tx.send("test-id".to_string()).await.unwrap();

    match finish(handle).await.unwrap_err() {
        RunError::Reload {
            priority,
            reloader,
            trigger,
            source,
        } => {
            assert_eq!(priority, 10);
            assert_eq!(reloader, "p10");
            assert_eq!(trigger, "test-id");
            assert_eq!(source.to_string(), "reload failed: p10 broke");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(snapshot(&log), vec!["p4:test-id", "p10:test-id"]);
}

#[tokio::test]
async fn whole_group_finishes_before_next_priority_starts() {
    let done = Arc::new(AtomicUsize::new(0));
    let seen_by_next = Arc::new(Mutex::new(None));
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());

    for delay_ms in [30_u64, 5, 15] {
        let done = done.clone();
        manager.register_reloader(
            0,
            ReloaderFn::arc("slow", move |_ctx: CancellationToken, _id: String| {
                let done = done.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ReloadError>(())
                }
            }),
        );
    }
    {
        let done = done.clone();
        let seen = seen_by_next.clone();
        manager.register_reloader(
            1,
            ReloaderFn::arc("next", move |_ctx: CancellationToken, id: String| {
                let done = done.clone();
                let seen = seen.clone();
                async move {
                    *seen.lock().unwrap() = Some((done.load(Ordering::SeqCst), id));
                    Ok::<_, ReloadError>(())
                }
            }),
        );
    }
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("cfg".to_string()).await.unwrap();

    eventually(|| seen_by_next.lock().unwrap().is_some()).await;
    ctx.cancel();
    finish(handle).await.unwrap();

    assert_eq!(*seen_by_next.lock().unwrap(), Some((3, "cfg".to_string())));
}

#[tokio::test]
async fn cancel_while_waiting_returns_promptly() {
    let log = calls();
    let (_tx, rx) = mpsc::channel::<String>(1);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::ok("only", &log));
    // channel notifier ignores the token: the manager must still stop
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tokio::time::sleep(Duration::from_millis(20)).await;
    ctx.cancel();

    let res = tokio::time::timeout(Duration::from_millis(500), handle)
        .await
        .expect("run should stop promptly")
        .expect("run task panicked");
    assert!(res.is_ok());
    assert!(snapshot(&log).is_empty());
}

#[tokio::test]
async fn already_cancelled_context_returns_immediately() {
    let (_tx, rx) = mpsc::channel::<String>(1);
    let mut manager = Manager::new(Config::default());
    manager.register_notifier(NotifierChan::arc(rx));

    let ctx = CancellationToken::new();
    ctx.cancel();
    manager.run(ctx).await.unwrap();
}

#[tokio::test]
async fn same_reloader_under_two_priorities_runs_twice() {
    let log = calls();
    let shared = Probe::ok("shared", &log);
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(1, shared.clone());
    manager.register_reloader(2, shared);
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("x".to_string()).await.unwrap();

    eventually(|| snapshot(&log).len() == 2).await;
    ctx.cancel();
    finish(handle).await.unwrap();
    assert_eq!(snapshot(&log), vec!["shared:x", "shared:x"]);
}

#[tokio::test]
async fn run_without_notifier_is_misconfiguration() {
    let log = calls();
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::ok("only", &log));

    let err = manager.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, RunError::NotifierMissing));
    assert_eq!(manager.reloader_count(), 1);
}

#[tokio::test]
async fn last_registered_notifier_wins() {
    let log = calls();
    let (_old_tx, old_rx) = mpsc::channel::<String>(1);
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::ok("only", &log));
    manager.register_notifier(NotifierChan::arc(old_rx));
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("new".to_string()).await.unwrap();

    eventually(|| snapshot(&log).len() == 1).await;
    ctx.cancel();
    finish(handle).await.unwrap();
    assert_eq!(snapshot(&log), vec!["only:new"]);
}

#[tokio::test]
async fn manager_can_run_again_after_cancellation() {
    let log = calls();
    let (tx, rx) = mpsc::channel(4);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::ok("only", &log));
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let first = CancellationToken::new();
    let handle = spawn_run(&manager, &first);
    tx.send("one".to_string()).await.unwrap();
    eventually(|| snapshot(&log).len() == 1).await;
    first.cancel();
    finish(handle).await.unwrap();

    // the aborted wait of the first run must not swallow this value
    tx.send("two".to_string()).await.unwrap();
    let second = CancellationToken::new();
    let handle = spawn_run(&manager, &second);
    eventually(|| snapshot(&log).len() == 2).await;
    second.cancel();
    finish(handle).await.unwrap();

    assert_eq!(snapshot(&log), vec!["only:one", "only:two"]);
}

#[tokio::test]
async fn no_reloaders_means_trivial_cycles() {
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);
    let mut events = manager.events();

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("empty".to_string()).await.unwrap();

    let completed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let ev = events.recv().await.expect("bus open");
            if ev.kind == EventKind::CycleCompleted {
                return ev;
            }
        }
    })
    .await
    .expect("cycle should complete");
    assert_eq!(completed.trigger.as_deref(), Some("empty"));
    assert!(!handle.is_finished());

    ctx.cancel();
    finish(handle).await.unwrap();
}

#[tokio::test]
async fn cancellation_during_dispatch_lets_the_cycle_finish() {
    let finished = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    {
        let finished = finished.clone();
        let started = started.clone();
        manager.register_reloader(
            0,
            ReloaderFn::arc("slow", move |_ctx: CancellationToken, _id: String| {
                let finished = finished.clone();
                let started = started.clone();
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(40)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ReloadError>(())
                }
            }),
        );
    }
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("t".to_string()).await.unwrap();
    eventually(|| started.load(Ordering::SeqCst) == 1).await;
    ctx.cancel();

    finish(handle).await.unwrap();
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrency_limit_serializes_a_group() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config {
        max_concurrent: 1,
        ..Config::default()
    });

    for _ in 0..3 {
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        let done = done.clone();
        manager.register_reloader(
            0,
            ReloaderFn::arc("limited", move |_ctx: CancellationToken, _id: String| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                let done = done.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ReloadError>(())
                }
            }),
        );
    }
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("t".to_string()).await.unwrap();
    eventually(|| done.load(Ordering::SeqCst) == 3).await;
    ctx.cancel();
    finish(handle).await.unwrap();

    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn events_describe_a_cycle_in_order() {
    let log = calls();
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(3, Probe::ok("cache", &log));
    manager.register_notifier(NotifierChan::arc(rx));
    let manager = Arc::new(manager);
    let mut events = manager.events();

    let ctx = CancellationToken::new();
    let handle = spawn_run(&manager, &ctx);
    tx.send("cfg".to_string()).await.unwrap();
    eventually(|| snapshot(&log).len() == 1).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctx.cancel();
    finish(handle).await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.kind);
    }
    assert_eq!(
        kinds,
        vec![
            EventKind::RunStarting,
            EventKind::TriggerReceived,
            EventKind::GroupStarting,
            EventKind::ReloaderSucceeded,
            EventKind::CycleCompleted,
            EventKind::RunStopped,
        ]
    );
}

struct Collector {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Collector {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[tokio::test]
async fn builder_wires_subscribers_and_registrations() {
    let log = calls();
    let collector = Arc::new(Collector {
        kinds: Mutex::new(Vec::new()),
    });
    let (tx, rx) = mpsc::channel(1);
    let manager = Manager::builder(Config::default())
        .with_subscribers(vec![collector.clone() as Arc<dyn Subscribe>])
        .with_notifier(NotifierChan::arc(rx))
        .with_reloader(1, Probe::failing("db", &log))
        .with_reloader(0, Probe::ok("settings", &log))
        .build();
    let manager = Arc::new(manager);

    let handle = spawn_run(&manager, &CancellationToken::new());
    tx.send("reload".to_string()).await.unwrap();
    let err = finish(handle).await.unwrap_err();
    assert_eq!(err.as_label(), "run_reload_failed");
    assert_eq!(snapshot(&log), vec!["settings:reload", "db:reload"]);

    eventually(|| {
        collector
            .kinds
            .lock()
            .unwrap()
            .contains(&EventKind::RunFailed)
    })
    .await;
    let kinds = collector.kinds.lock().unwrap().clone();
    assert!(kinds.contains(&EventKind::ReloaderFailed));
    assert!(!kinds.contains(&EventKind::CycleCompleted));
}

struct ExplodingNotifier;

#[async_trait]
impl Notifier for ExplodingNotifier {
    async fn notify(&self, _ctx: CancellationToken) -> Result<String, NotifyError> {
        panic!("notifier exploded");
    }
}

struct ExplodingReloader;

#[async_trait]
impl Reloader for ExplodingReloader {
    fn name(&self) -> &str {
        "exploding"
    }

    async fn reload(&self, _ctx: CancellationToken, _id: &str) -> Result<(), ReloadError> {
        panic!("reloader exploded");
    }
}

#[tokio::test]
async fn panicking_notifier_ends_run_with_notify_error() {
    let log = calls();
    let mut manager = Manager::new(Config::default());
    manager.register_reloader(0, Probe::ok("only", &log));
    manager.register_notifier(Arc::new(ExplodingNotifier));

    let err = manager.run(CancellationToken::new()).await.unwrap_err();

    match err {
        RunError::Notify {
            source: NotifyError::Panicked { info },
        } => assert_eq!(info, "notifier exploded"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(snapshot(&log).is_empty());
}

#[tokio::test]
async fn panicking_reloader_fails_run_and_skips_later_groups() {
    let log = calls();
    let (tx, rx) = mpsc::channel(1);
    let mut manager = Manager::new(Config::default());
    manager.register_notifier(NotifierChan::arc(rx));
    manager.register_reloader(0, Arc::new(ExplodingReloader));
    manager.register_reloader(0, Probe::ok("sibling", &log));
    manager.register_reloader(5, Probe::ok("later", &log));
    let manager = Arc::new(manager);

    let handle = spawn_run(&manager, &CancellationToken::new());
    tx.send("t1".to_string()).await.unwrap();
    let err = finish(handle).await.unwrap_err();

    match err {
        RunError::Reload {
            priority,
            reloader,
            source: ReloadError::Panicked { info },
            ..
        } => {
            assert_eq!(priority, 0);
            assert_eq!(reloader, "exploding");
            assert_eq!(info, "reloader exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(snapshot(&log), vec!["sibling:t1"]);
}

struct PanickingSubscriber {
    calls: AtomicUsize,
}

#[async_trait]
impl Subscribe for PanickingSubscriber {
    async fn on_event(&self, _event: &Event) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("subscriber exploded");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

#[tokio::test]
async fn panicking_subscriber_sees_each_event_once() {
    let log = calls();
    let panicking = Arc::new(PanickingSubscriber {
        calls: AtomicUsize::new(0),
    });
    let collector = Arc::new(Collector {
        kinds: Mutex::new(Vec::new()),
    });
    let (tx, rx) = mpsc::channel(1);
    let manager = Manager::builder(Config::default())
        .with_subscribers(vec![
            panicking.clone() as Arc<dyn Subscribe>,
            collector.clone() as Arc<dyn Subscribe>,
        ])
        .with_notifier(NotifierChan::arc(rx))
        .with_reloader(0, Probe::failing("db", &log))
        .build();
    let manager = Arc::new(manager);

    let handle = spawn_run(&manager, &CancellationToken::new());
    tx.send("t1".to_string()).await.unwrap();
    finish(handle).await.unwrap_err();

    // RunStarting, TriggerReceived, GroupStarting, ReloaderFailed, RunFailed
    eventually(|| panicking.calls.load(Ordering::SeqCst) == 5).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(panicking.calls.load(Ordering::SeqCst), 5);

    let panics = collector
        .kinds
        .lock()
        .unwrap()
        .iter()
        .filter(|k| **k == EventKind::SubscriberPanicked)
        .count();
    assert_eq!(panics, 5);
}
