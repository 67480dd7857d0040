//! Navigation requests raised by the client core.
//!
//! SYSTEM CONTEXT
//! ==============
//! The HTTP wrapper forces a full navigation to the application root when a
//! request is rejected with 401. The core only announces the navigation; the
//! front end decides what a "full navigation" means (reload a page, reset a
//! REPL, exit a command).

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::info;

/// Application root, the target of forced navigations.
pub const ROOT_PATH: &str = "/";

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Publishes the latest requested location on a watch channel.
#[derive(Debug)]
pub struct WatchNavigator {
    tx: watch::Sender<String>,
    count: AtomicU64,
}

impl WatchNavigator {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ROOT_PATH.to_owned());
        Self { tx, count: AtomicU64::new(0) }
    }

    /// Receiver that observes every subsequent navigation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Number of navigations requested so far.
    #[must_use]
    pub fn navigations(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Default for WatchNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for WatchNavigator {
    fn navigate(&self, path: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        info!(%path, "navigation requested");
        // send_replace succeeds with or without live receivers.
        self.tx.send_replace(path.to_owned());
    }
}
