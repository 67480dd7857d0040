//! Authentication lifecycle: register, login, verify, logout, local clear.
//!
//! ARCHITECTURE
//! ============
//! Session data lives in a [`SessionCell`] created before the HTTP client and
//! installed into it as the [`TokenProvider`]. [`SessionStore`] owns the
//! operations that change it. The split keeps the HTTP client free of any
//! reference back to the store.
//!
//! ```text
//! anonymous --register--> authenticating --ok--> anonymous
//! anonymous --login-----> authenticating --ok--> authenticated
//! *         --verify----> verifying      --ok--> authenticated
//!                                        --err-> anonymous
//! *         --logout----> anonymous (always)
//! ```
//!
//! ERROR HANDLING
//! ==============
//! `register` notifies and returns the error so a form can render it inline.
//! Every other operation notifies and swallows.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::flight::InFlight;
use super::{cancellable, report_failure};
use crate::forms::{LoginForm, RegisterForm};
use crate::net::api;
use crate::net::error::ApiError;
use crate::net::http::{HttpClient, TokenProvider};
use crate::net::types::{AuthResponse, User, VerifyResponse};
use crate::notify::{Notifier, OpLabel};
use crate::storage::{TOKEN_KEY, TokenStorage};

const REGISTER: OpLabel = OpLabel::new("Registration", "register");
const LOGIN: OpLabel = OpLabel::new("Login", "login");
const VERIFY: OpLabel = OpLabel::new("Verify", "verify");
const LOGOUT: OpLabel = OpLabel::new("Logout", "logout");

/// Who the client believes is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

/// Shared, lock-protected session snapshot.
#[derive(Debug, Default)]
pub struct SessionCell {
    inner: RwLock<Session>,
}

impl SessionCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session carrying whatever token survived the last run.
    #[must_use]
    pub fn rehydrate(storage: &dyn TokenStorage) -> Self {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.trim().is_empty());
        debug!(rehydrated = token.is_some(), "session: start");
        Self { inner: RwLock::new(Session { token, user: None }) }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Install `user`, and `token` when one was issued. A missing token keeps
    /// the current one.
    pub fn establish(&self, token: Option<String>, user: User) {
        let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if token.is_some() {
            session.token = token;
        }
        session.user = Some(user);
    }

    pub fn set_user(&self, user: User) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }

    pub fn reset(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Session::default();
    }
}

impl TokenProvider for SessionCell {
    fn token(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Verifying,
}

pub struct SessionStore {
    http: Arc<HttpClient>,
    cell: Arc<SessionCell>,
    storage: Arc<dyn TokenStorage>,
    notifier: Arc<dyn Notifier>,
    registering: InFlight,
    logging_in: InFlight,
    verifying: InFlight,
}

impl SessionStore {
    #[must_use]
    pub fn new(
        http: Arc<HttpClient>,
        cell: Arc<SessionCell>,
        storage: Arc<dyn TokenStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            http,
            cell,
            storage,
            notifier,
            registering: InFlight::new(),
            logging_in: InFlight::new(),
            verifying: InFlight::new(),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn session(&self) -> Session {
        self.cell.snapshot()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.cell.snapshot().user
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.cell.token()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_verifying() {
            SessionPhase::Verifying
        } else if self.is_registering() || self.is_logging_in() {
            SessionPhase::Authenticating
        } else if self.cell.snapshot().user.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    #[must_use]
    pub fn is_registering(&self) -> bool {
        self.registering.get()
    }

    #[must_use]
    pub fn is_logging_in(&self) -> bool {
        self.logging_in.get()
    }

    #[must_use]
    pub fn is_verifying(&self) -> bool {
        self.verifying.get()
    }

    /// Replace the signed-in user wholesale. Used by the profile store.
    pub(crate) fn replace_user(&self, user: User) {
        self.cell.set_user(user);
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns the failure after notifying: validation, any non-201 answer,
    /// transport failure, or cancellation.
    pub async fn register(&self, form: &RegisterForm, cancel: &CancellationToken) -> Result<(), ApiError> {
        let _flight = self.registering.begin();
        match cancellable(cancel, self.request_register(form)).await {
            Ok(()) => {
                info!(username = %form.username, "session: registered");
                self.notifier.success(&REGISTER.succeeded());
                Ok(())
            }
            Err(e) => {
                report_failure(self.notifier.as_ref(), REGISTER, &e);
                Err(e)
            }
        }
    }

    async fn request_register(&self, form: &RegisterForm) -> Result<(), ApiError> {
        form.validate()?;
        self.http.post(api::AUTH_REGISTER, form).await?.expect_status(201)?;
        Ok(())
    }

    /// Sign in and persist the issued token.
    pub async fn login(&self, form: &LoginForm, cancel: &CancellationToken) {
        let _flight = self.logging_in.begin();
        match cancellable(cancel, self.request_login(form)).await {
            Ok(auth) => {
                info!(username = %auth.user.username, "session: logged in");
                self.storage.set(TOKEN_KEY, &auth.token);
                self.cell.establish(Some(auth.token), auth.user);
                self.notifier.success(&LOGIN.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), LOGIN, &e),
        }
    }

    async fn request_login(&self, form: &LoginForm) -> Result<AuthResponse, ApiError> {
        form.validate()?;
        self.http.post(api::AUTH_LOGIN, form).await?.expect_status(200)?.json()
    }

    /// Validate the current token and refresh the user. Any failure except
    /// cancellation ends the session.
    pub async fn verify(&self, cancel: &CancellationToken) {
        let _flight = self.verifying.begin();
        match cancellable(cancel, self.request_verify()).await {
            Ok(body) => {
                let token = body.token().map(str::to_owned);
                if let Some(token) = &token {
                    self.storage.set(TOKEN_KEY, token);
                }
                let user = body.into_user();
                info!(username = %user.username, refreshed = token.is_some(), "session: verified");
                self.cell.establish(token, user);
                self.notifier.success(&VERIFY.succeeded());
            }
            Err(e) => {
                if !matches!(e, ApiError::Cancelled) {
                    self.clear_auth();
                }
                report_failure(self.notifier.as_ref(), VERIFY, &e);
            }
        }
    }

    async fn request_verify(&self) -> Result<VerifyResponse, ApiError> {
        self.http.get(api::AUTH_VERIFY).await?.expect_status(200)?.json()
    }

    /// Tell the backend, then end the session locally whatever it answered.
    pub async fn logout(&self, cancel: &CancellationToken) {
        let result = cancellable(cancel, self.request_logout()).await;
        self.clear_auth();
        match result {
            Ok(()) => self.notifier.success(&LOGOUT.succeeded()),
            Err(e) => report_failure(self.notifier.as_ref(), LOGOUT, &e),
        }
    }

    async fn request_logout(&self) -> Result<(), ApiError> {
        self.http.post_empty(api::AUTH_LOGOUT).await?.expect_status(200)?;
        Ok(())
    }

    /// Local transition to anonymous. No network.
    pub fn clear_auth(&self) {
        self.storage.remove(TOKEN_KEY);
        self.cell.reset();
        info!("session: cleared");
    }
}
