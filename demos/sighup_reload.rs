//! # Example: sighup_reload
//!
//! Reloads two resources in order every time the process receives `SIGHUP`.
//!
//! Shows how to:
//! - Register reloaders under different priorities
//! - Use [`SignalNotifier::hangup`] as the trigger source
//! - Attach [`LogWriter`] to see reload events through `tracing`
//! - Stop the manager cleanly on Ctrl-C
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► Manager::run(ctx)
//!   │     └─► wait for SIGHUP
//!   │           ├─► priority 0:  "settings" reloads
//!   │           └─► priority 10: "http-routes" reloads
//!   └─► Ctrl-C ──► ctx.cancel() ──► run returns Ok(())
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example sighup_reload --features logging
//! kill -HUP <pid>
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reloadvisor::{
    Config, LogWriter, Manager, ReloadError, ReloaderFn, SignalNotifier, Subscribe,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let generation = Arc::new(AtomicU64::new(0));
    let settings_gen = generation.clone();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let manager = Manager::builder(Config::default())
        .with_subscribers(subs)
        .with_notifier(Arc::new(SignalNotifier::hangup()?))
        .with_reloader(
            0,
            ReloaderFn::arc("settings", move |_ctx: CancellationToken, id: String| {
                let generation = settings_gen.clone();
                async move {
                    let n = generation.fetch_add(1, Ordering::SeqCst) + 1;
                    println!("[settings] generation {n} loaded after {id}");
                    Ok::<_, ReloadError>(())
                }
            }),
        )
        .with_reloader(
            10,
            ReloaderFn::arc("http-routes", |ctx: CancellationToken, _id: String| async move {
                if ctx.is_cancelled() {
                    return Err(ReloadError::Canceled);
                }
                println!("[http-routes] rebuilt from fresh settings");
                Ok(())
            }),
        )
        .build();

    println!("pid {}: send SIGHUP to reload, Ctrl-C to stop", std::process::id());

    let ctx = CancellationToken::new();
    let stop = ctx.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        stop.cancel();
    });

    manager.run(ctx).await?;
    println!("stopped after {} reloads", generation.load(Ordering::SeqCst));
    Ok(())
}
