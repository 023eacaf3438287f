//! Error types used by the reload manager, notifiers and reloaders.
//!
//! This module defines three error enums:
//!
//! - [`NotifyError`]: errors raised by a [`Notifier`](crate::Notifier) while waiting for a trigger.
//! - [`ReloadError`]: errors raised by an individual [`Reloader`](crate::Reloader).
//! - [`RunError`]: the single error returned by [`Manager::run`](crate::Manager::run).
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// # Errors produced while waiting for a trigger.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The trigger source itself failed (e.g. upstream connection lost).
    #[error("notifier failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The underlying channel or signal stream was closed.
    ///
    /// Channel-backed notifiers are reused for every cycle; closing them is a caller error.
    #[error("notifier source closed")]
    Closed,

    /// The notifier panicked while waiting.
    #[error("notifier panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl NotifyError {
    /// Shorthand for [`NotifyError::Fail`].
    pub fn fail(error: impl fmt::Display) -> Self {
        NotifyError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use reloadvisor::NotifyError;
    ///
    /// assert_eq!(NotifyError::Closed.as_label(), "notify_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyError::Fail { .. } => "notify_failed",
            NotifyError::Closed => "notify_closed",
            NotifyError::Panicked { .. } => "notify_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            NotifyError::Fail { error } => format!("error: {error}"),
            NotifyError::Closed => "source closed".to_string(),
            NotifyError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by a single reload.
///
/// A failure of one reloader does not imply the failure of its siblings,
/// but it stops the cycle before the next priority group.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReloadError {
    /// The resource could not be reloaded.
    #[error("reload failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The reloader observed cancellation and gave up.
    #[error("context cancelled")]
    Canceled,

    /// The reloader panicked.
    #[error("reloader panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ReloadError {
    /// Shorthand for [`ReloadError::Fail`].
    ///
    /// # Example
    /// ```
    /// use reloadvisor::ReloadError;
    ///
    /// let err = ReloadError::fail("db unreachable");
    /// assert_eq!(err.to_string(), "reload failed: db unreachable");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        ReloadError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReloadError::Fail { .. } => "reload_failed",
            ReloadError::Canceled => "reload_canceled",
            ReloadError::Panicked { .. } => "reload_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ReloadError::Fail { error } => format!("error: {error}"),
            ReloadError::Canceled => "context cancelled".to_string(),
            ReloadError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors returned by [`Manager::run`](crate::Manager::run).
///
/// `Ok(())` from `run` always means a clean shutdown through cancellation;
/// every other way out of the loop is one of these variants.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// `run` was called before any notifier was registered.
    #[error("no notifier registered")]
    NotifierMissing,

    /// The notifier reported an error instead of a trigger.
    #[error("waiting for trigger failed")]
    Notify {
        /// The notifier error.
        #[source]
        source: NotifyError,
    },

    /// A reloader failed; groups after `priority` were skipped.
    #[error("reloader {reloader:?} (priority {priority}) failed for trigger {trigger:?}")]
    Reload {
        /// Priority of the failing group.
        priority: i64,
        /// Name of the failing reloader.
        reloader: String,
        /// Trigger identifier of the aborted cycle.
        trigger: String,
        /// The reloader error.
        #[source]
        source: ReloadError,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use reloadvisor::RunError;
    ///
    /// assert_eq!(RunError::NotifierMissing.as_label(), "run_notifier_missing");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::NotifierMissing => "run_notifier_missing",
            RunError::Notify { .. } => "run_notify_failed",
            RunError::Reload { .. } => "run_reload_failed",
        }
    }

    /// Returns a human-readable message including the underlying cause.
    pub fn as_message(&self) -> String {
        match self {
            RunError::NotifierMissing => "no notifier registered".to_string(),
            RunError::Notify { source } => format!("notify: {}", source.as_message()),
            RunError::Reload {
                priority,
                reloader,
                trigger,
                source,
            } => format!(
                "reloader={reloader} priority={priority} trigger={trigger} {}",
                source.as_message()
            ),
        }
    }

    /// True if the loop stopped because the notifier failed.
    pub fn is_notify(&self) -> bool {
        matches!(self, RunError::Notify { .. })
    }

    /// True if the loop stopped because a reloader failed.
    pub fn is_reload(&self) -> bool {
        matches!(self, RunError::Reload { .. })
    }
}

/// Renders a panic payload caught from a task or `catch_unwind`.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
