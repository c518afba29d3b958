//! Pacer double that counts pauses instead of sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::dispatch::Pacer;

/// Counts the pauses requested by the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    read_errors: Arc<AtomicUsize>,
    iterations: Arc<AtomicUsize>,
}

impl RecordingPacer {
    /// Pauses requested after read failures.
    #[must_use]
    pub fn read_error_pauses(&self) -> usize {
        self.read_errors.load(Ordering::SeqCst)
    }

    /// Pauses requested after completed iterations.
    #[must_use]
    pub fn iteration_pauses(&self) -> usize {
        self.iterations.load(Ordering::SeqCst)
    }
}

impl Pacer for RecordingPacer {
    fn after_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::SeqCst);
    }

    fn after_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::SeqCst);
    }
}
