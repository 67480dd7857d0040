//! Fanimal client core.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything a front end needs to talk to the Fanimal backend: a single
//! authenticated HTTP wrapper, the session store that owns the bearer token,
//! and cached domain stores for shelters, subscriptions, and user profiles.
//! Presentation is left to the caller (see the `fanimal-cli` package).
//!
//! ARCHITECTURE
//! ============
//! Dependency order, leaves first:
//! `net` (transport + interceptors) → `state::session` → domain stores → `app`.
//! The HTTP wrapper never names the session store; it reads the token through
//! the [`net::http::TokenProvider`] seam.

pub mod app;
pub mod config;
pub mod forms;
pub mod navigation;
pub mod net;
pub mod notify;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::Fanimal;
pub use config::ClientConfig;
pub use net::error::ApiError;
pub use tokio_util::sync::CancellationToken;
