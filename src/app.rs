//! Composition root: wires storage, transport, session, and domain stores.
//!
//! ARCHITECTURE
//! ============
//! Construction order follows the dependency graph, leaves first:
//!
//! ```text
//! storage -> session cell -> navigator -> notifier -> transport
//!         -> HttpClient (token provider = session cell)
//!         -> SessionStore -> ShelterStore, SubscriptionStore, UserStore
//! ```
//!
//! The session cell exists before the HTTP client, so the provider is passed
//! at construction and never registered late.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::navigation::{Navigator, WatchNavigator};
use crate::net::http::HttpClient;
use crate::net::transport::{ReqwestTransport, Transport, TransportError};
use crate::notify::{NotificationLog, Notifier};
use crate::state::session::{SessionCell, SessionStore};
use crate::state::shelters::ShelterStore;
use crate::state::subscriptions::SubscriptionStore;
use crate::state::users::UserStore;
use crate::storage::{FileStorage, TokenStorage};

/// A forced navigation is a full reload: the in-memory session does not
/// survive it, only what storage still holds.
struct ReloadNavigator {
    location: WatchNavigator,
    session: Arc<SessionCell>,
}

impl Navigator for ReloadNavigator {
    fn navigate(&self, path: &str) {
        self.session.reset();
        self.location.navigate(path);
    }
}

/// One client instance: every store sharing one HTTP wrapper and session.
pub struct Fanimal {
    http: Arc<HttpClient>,
    session: Arc<SessionStore>,
    shelters: ShelterStore,
    subscriptions: SubscriptionStore,
    users: UserStore,
    navigator: Arc<ReloadNavigator>,
    notifications: Arc<NotificationLog>,
}

impl Fanimal {
    /// Build a client backed by file storage and the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let storage = Arc::new(FileStorage::open(config.token_file.clone()));
        let transport = Arc::new(ReqwestTransport::new(config.timeouts)?);
        info!(
            base_url = %config.base_url,
            token_file = %config.token_file.display(),
            request_timeout_secs = config.timeouts.request_secs,
            "client: configured"
        );
        Ok(Self::with_parts(&config.base_url, transport, storage))
    }

    /// Build a client over caller-supplied transport and storage.
    #[must_use]
    pub fn with_parts(base_url: &str, transport: Arc<dyn Transport>, storage: Arc<dyn TokenStorage>) -> Self {
        let cell = Arc::new(SessionCell::rehydrate(storage.as_ref()));
        let navigator = Arc::new(ReloadNavigator { location: WatchNavigator::new(), session: Arc::clone(&cell) });
        let notifications = Arc::new(NotificationLog::new());
        let notifier: Arc<dyn Notifier> = notifications.clone();

        let http = Arc::new(
            HttpClient::new(base_url, transport, Arc::clone(&storage), navigator.clone())
                .with_token_provider(cell.clone()),
        );
        let session = Arc::new(SessionStore::new(Arc::clone(&http), cell, storage, Arc::clone(&notifier)));
        let shelters = ShelterStore::new(Arc::clone(&http), Arc::clone(&notifier));
        let subscriptions = SubscriptionStore::new(Arc::clone(&http), Arc::clone(&notifier));
        let users = UserStore::new(Arc::clone(&http), Arc::clone(&session), notifier);

        Self { http, session, shelters, subscriptions, users, navigator, notifications }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn shelters(&self) -> &ShelterStore {
        &self.shelters
    }

    #[must_use]
    pub fn subscriptions(&self) -> &SubscriptionStore {
        &self.subscriptions
    }

    #[must_use]
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Forced navigations requested by the HTTP wrapper.
    #[must_use]
    pub fn navigator(&self) -> &WatchNavigator {
        &self.navigator.location
    }

    /// Notifications not yet drained by the front end.
    #[must_use]
    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }
}
