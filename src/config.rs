//! # Manager configuration.
//!
//! Provides [`Config`], the centralized settings for a [`Manager`](crate::Manager).
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no per-group semaphore created)
//! - `bus_capacity = 0` → clamped to 1

/// Configuration for the reload manager.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `max_concurrent`: reloaders of one priority group running at once (`0` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe `Lagged`
    /// and skip older items.
    pub bus_capacity: usize,

    /// Maximum number of reloaders of a single priority group running concurrently.
    ///
    /// - `0` = unlimited (every reloader of the group starts at once)
    /// - `1` = reloaders of a group run one after another
    /// - `n > 1` = at most `n` at a time
    ///
    /// Groups themselves are always sequential.
    pub max_concurrent: usize,
}

impl Config {
    /// Returns the per-group concurrency limit as an `Option`.
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `max_concurrent = 0` (unlimited)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            max_concurrent: 0,
        }
    }
}
