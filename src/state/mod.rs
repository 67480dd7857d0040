//! Client-side stores: cached backend state plus the operations that mutate it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` owns identity; `shelters`, `subscriptions`, and `users` each own
//! one REST resource's slice of cache. No two stores share mutable state. The
//! user store reaches identity through a shared `Arc<SessionStore>`.
//!
//! DESIGN
//! ======
//! Every operation follows the same shape: raise its in-flight flag with a
//! guard, run the request under the caller's cancellation token, apply the
//! result only if the caller is still around, and report the outcome as a
//! notification. Failures are swallowed after reporting (except `register`).

pub mod cache;
pub mod flight;
pub mod session;
pub mod shelters;
pub mod subscriptions;
pub mod users;

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::net::error::ApiError;
use crate::notify::{Notifier, OpLabel};

/// Run `op` unless `cancel` fires first.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    op: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        result = op => result,
    }
}

/// Notify the user about a failed operation. Cancelled operations are silent.
pub(crate) fn report_failure(notifier: &dyn Notifier, label: OpLabel, error: &ApiError) {
    match error {
        ApiError::Cancelled => {
            debug!(op = label.verb, "operation cancelled; result discarded");
        }
        ApiError::UnexpectedStatus { status, expected } => {
            warn!(op = label.verb, status, expected, code = error.error_code(), "operation failed");
            notifier.error(&label.failed());
        }
        other => {
            warn!(op = label.verb, error = %other, code = other.error_code(), "operation failed");
            notifier.error(&label.unable(&other.to_string()));
        }
    }
}
