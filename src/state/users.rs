//! Profile operations. The signed-in user itself lives in the session.
//!
//! DESIGN
//! ======
//! This store never keeps its own copy of the current user. Reads and
//! mutations of the caller's profile go through the shared [`SessionStore`]:
//! `get_current_user` replaces the session user, and mutations re-run
//! `verify` so the session reflects what the backend now holds. Only other
//! users' profiles (`find_by_id`) are cached here.

#[cfg(test)]
#[path = "users_test.rs"]
mod users_test;

use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::flight::InFlight;
use super::session::SessionStore;
use super::{cancellable, report_failure};
use crate::forms::UserUpdateForm;
use crate::net::api;
use crate::net::error::ApiError;
use crate::net::http::HttpClient;
use crate::net::types::User;
use crate::notify::{Notifier, OpLabel};

const GET_CURRENT_USER: OpLabel = OpLabel::new("Get current user", "get current user");
const UPDATE_CURRENT_USER: OpLabel = OpLabel::new("Update current user", "update current user");
const FIND_BY_ID: OpLabel = OpLabel::new("Find by ID", "find by ID");
const DELETE: OpLabel = OpLabel::new("Delete", "delete");

pub struct UserStore {
    http: Arc<HttpClient>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    profile: RwLock<Option<User>>,
    getting_current_user: InFlight,
    updating_current_user: InFlight,
    finding_by_id: InFlight,
    deleting: InFlight,
}

impl UserStore {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, session: Arc<SessionStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http,
            session,
            notifier,
            profile: RwLock::new(None),
            getting_current_user: InFlight::new(),
            updating_current_user: InFlight::new(),
            finding_by_id: InFlight::new(),
            deleting: InFlight::new(),
        }
    }

    /// The signed-in user, read through the session.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    /// Last profile fetched by id.
    #[must_use]
    pub fn profile(&self) -> Option<User> {
        self.profile.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn is_getting_current_user(&self) -> bool {
        self.getting_current_user.get()
    }

    #[must_use]
    pub fn is_updating_current_user(&self) -> bool {
        self.updating_current_user.get()
    }

    #[must_use]
    pub fn is_finding_by_id(&self) -> bool {
        self.finding_by_id.get()
    }

    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.deleting.get()
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    pub async fn get_current_user(&self, cancel: &CancellationToken) {
        let _flight = self.getting_current_user.begin();
        match cancellable(cancel, self.request_me()).await {
            Ok(user) => {
                info!(username = %user.username, "users: fetched current");
                self.session.replace_user(user);
                self.notifier.success(&GET_CURRENT_USER.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), GET_CURRENT_USER, &e),
        }
    }

    async fn request_me(&self) -> Result<User, ApiError> {
        self.http.get(api::USERS_ME).await?.expect_status(200)?.json()
    }

    /// Save the caller's profile, then refresh the session from the backend.
    pub async fn update_current_user(&self, form: &UserUpdateForm, cancel: &CancellationToken) {
        let _flight = self.updating_current_user.begin();
        match cancellable(cancel, self.request_update_me(form)).await {
            Ok(()) => {
                info!("users: updated current");
                self.refresh_session(UPDATE_CURRENT_USER, cancel).await;
            }
            Err(e) => report_failure(self.notifier.as_ref(), UPDATE_CURRENT_USER, &e),
        }
    }

    async fn request_update_me(&self, form: &UserUpdateForm) -> Result<(), ApiError> {
        form.validate()?;
        self.http.put(api::USERS_ME, form).await?.expect_status(200)?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64, cancel: &CancellationToken) {
        let _flight = self.finding_by_id.begin();
        match cancellable(cancel, self.request_user(id)).await {
            Ok(user) => {
                info!(id, username = %user.username, "users: fetched one");
                *self.profile.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
                self.notifier.success(&FIND_BY_ID.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), FIND_BY_ID, &e),
        }
    }

    async fn request_user(&self, id: i64) -> Result<User, ApiError> {
        self.http.get(&api::user_endpoint(id)).await?.expect_status(200)?.json()
    }

    /// Delete an account, then re-verify. Deleting your own account ends the
    /// session through the failed verify.
    pub async fn delete_by_id(&self, id: i64, cancel: &CancellationToken) {
        let _flight = self.deleting.begin();
        match cancellable(cancel, self.request_delete(id)).await {
            Ok(()) => {
                info!(id, "users: deleted");
                let mut profile = self.profile.write().unwrap_or_else(PoisonError::into_inner);
                if profile.as_ref().is_some_and(|p| p.id == Some(id)) {
                    *profile = None;
                }
                drop(profile);
                self.refresh_session(DELETE, cancel).await;
            }
            Err(e) => report_failure(self.notifier.as_ref(), DELETE, &e),
        }
    }

    async fn request_delete(&self, id: i64) -> Result<(), ApiError> {
        self.http.delete(&api::user_endpoint(id)).await?.expect_status(204)?;
        Ok(())
    }

    /// Re-run verify after a successful mutation, then report the mutation.
    async fn refresh_session(&self, label: OpLabel, cancel: &CancellationToken) {
        self.session.verify(cancel).await;
        if cancel.is_cancelled() {
            debug!(op = label.verb, "operation cancelled during refresh");
            return;
        }
        self.notifier.success(&label.succeeded());
    }
}
