//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` moves bytes (reqwest in production, scripted in tests), `http`
//! wraps it with the bearer/401 interceptors every call passes through, `api`
//! names the endpoints, and `types` defines the wire schema.

pub mod api;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
