//! In-flight flags for store operations.

#[cfg(test)]
#[path = "flight_test.rs"]
mod flight_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// True strictly while one operation's request is pending.
///
/// Overlapping calls to the same operation share the flag: whichever settles
/// first lowers it. Matches the one-boolean-per-operation contract.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag until the returned guard drops.
    #[must_use = "the flag drops back to false as soon as the guard is dropped"]
    pub fn begin(&self) -> InFlightGuard {
        self.0.store(true, Ordering::SeqCst);
        InFlightGuard(Arc::clone(&self.0))
    }
}

/// Lowers its flag on drop: success, error, cancellation, or panic.
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
