use std::sync::Arc;

use crate::config::Config;
use crate::core::manager::Manager;
use crate::notifiers::NotifierRef;
use crate::reloaders::ReloaderRef;
use crate::subscribers::Subscribe;

/// Builder for constructing a [`Manager`] with subscribers and registrations in one go.
pub struct ManagerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    notifier: Option<NotifierRef>,
    reloaders: Vec<(i64, ReloaderRef)>,
}

impl ManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            notifier: None,
            reloaders: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive manager events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the notifier (last call wins).
    pub fn with_notifier(mut self, notifier: NotifierRef) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Registers a reloader under `priority`.
    pub fn with_reloader(mut self, priority: i64, reloader: ReloaderRef) -> Self {
        self.reloaders.push((priority, reloader));
        self
    }

    /// Builds the manager.
    ///
    /// Spawns subscriber workers, so it must be called inside a tokio runtime
    /// when subscribers are set.
    pub fn build(self) -> Manager {
        let mut manager = Manager::new_internal(self.cfg, self.subscribers);
        if let Some(notifier) = self.notifier {
            manager.register_notifier(notifier);
        }
        for (priority, reloader) in self.reloaders {
            manager.register_reloader(priority, reloader);
        }
        manager
    }
}
