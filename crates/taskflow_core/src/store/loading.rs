//! Deadline-based in-flight flag.
//!
//! The flag only reports; it never blocks or delays the data it describes.

use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone)]
pub(crate) struct LoadingFlag {
    settles_at: Option<Instant>,
}

impl LoadingFlag {
    /// Marks a load as in flight for `latency`. Zero latency settles at once.
    pub(crate) fn begin(&mut self, latency: Duration) {
        self.settles_at = if latency.is_zero() {
            None
        } else {
            Some(Instant::now() + latency)
        };
    }

    pub(crate) fn is_active(&self) -> bool {
        self.settles_at
            .is_some_and(|deadline| Instant::now() < deadline)
    }
}
