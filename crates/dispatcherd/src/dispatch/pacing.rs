//! Loop pacing strategy.
//!
//! The dispatcher never sleeps directly. It asks a [`Pacer`] to wait after a
//! failed read and after every finished iteration, so tests can substitute a
//! recorder that returns immediately.

use std::thread;
use std::time::Duration;

use dispatcher_config::{Config, DEFAULT_ITERATION_DELAY_MS};

/// Pause applied after a failed read.
pub const READ_ERROR_DELAY: Duration = Duration::from_millis(500);

/// Strategy deciding how long the loop waits between steps.
pub trait Pacer: Send {
    /// Called after a read failure, before the next read is attempted.
    fn after_read_error(&self);

    /// Called after every iteration that consumed a message.
    fn after_iteration(&self);
}

/// Pacer sleeping for fixed durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPacer {
    read_error_delay: Duration,
    iteration_delay: Duration,
}

impl FixedPacer {
    /// Builds a pacer with explicit delays.
    #[must_use]
    pub fn new(read_error_delay: Duration, iteration_delay: Duration) -> Self {
        Self {
            read_error_delay,
            iteration_delay,
        }
    }

    /// Builds a pacer applying the configured delay after reads and iterations.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let delay = config.iteration_delay();
        Self::new(delay, delay)
    }

    /// Delay applied after a read failure.
    #[must_use]
    pub fn read_error_delay(&self) -> Duration {
        self.read_error_delay
    }

    /// Delay applied after each iteration.
    #[must_use]
    pub fn iteration_delay(&self) -> Duration {
        self.iteration_delay
    }
}

impl Default for FixedPacer {
    fn default() -> Self {
        Self::new(
            READ_ERROR_DELAY,
            Duration::from_millis(DEFAULT_ITERATION_DELAY_MS),
        )
    }
}

impl Pacer for FixedPacer {
    fn after_read_error(&self) {
        thread::sleep(self.read_error_delay);
    }

    fn after_iteration(&self) {
        thread::sleep(self.iteration_delay);
    }
}
