//! The signed-in user's donation subscriptions.

#[cfg(test)]
#[path = "subscriptions_test.rs"]
mod subscriptions_test;

use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::flight::InFlight;
use super::{cache, cancellable, report_failure};
use crate::forms::SubscribeForm;
use crate::net::api;
use crate::net::error::ApiError;
use crate::net::http::HttpClient;
use crate::net::types::Subscription;
use crate::notify::{Notifier, OpLabel};

const FIND_ALL_BY_USER: OpLabel = OpLabel::new("Find all by user", "find all by user");
const SUBSCRIBE: OpLabel = OpLabel::new("Subscribe", "subscribe");
const UNSUBSCRIBE: OpLabel = OpLabel::new("Unsubscribe", "unsubscribe");

#[derive(Debug, Default)]
struct Cached {
    subscriptions: Option<Vec<Subscription>>,
    subscription: Option<Subscription>,
}

pub struct SubscriptionStore {
    http: Arc<HttpClient>,
    notifier: Arc<dyn Notifier>,
    cached: RwLock<Cached>,
    finding_all_by_user: InFlight,
    subscribing: InFlight,
    unsubscribing: InFlight,
}

impl SubscriptionStore {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http,
            notifier,
            cached: RwLock::new(Cached::default()),
            finding_all_by_user: InFlight::new(),
            subscribing: InFlight::new(),
            unsubscribing: InFlight::new(),
        }
    }

    #[must_use]
    pub fn subscriptions(&self) -> Option<Vec<Subscription>> {
        self.cached.read().unwrap_or_else(PoisonError::into_inner).subscriptions.clone()
    }

    /// Most recently created subscription.
    #[must_use]
    pub fn subscription(&self) -> Option<Subscription> {
        self.cached.read().unwrap_or_else(PoisonError::into_inner).subscription.clone()
    }

    /// Sum of monthly amounts across the cached subscriptions.
    #[must_use]
    pub fn monthly_total(&self) -> f64 {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subscriptions
            .iter()
            .flatten()
            .map(Subscription::monthly_amount)
            .sum()
    }

    #[must_use]
    pub fn is_finding_all_by_user(&self) -> bool {
        self.finding_all_by_user.get()
    }

    #[must_use]
    pub fn is_subscribing(&self) -> bool {
        self.subscribing.get()
    }

    #[must_use]
    pub fn is_unsubscribing(&self) -> bool {
        self.unsubscribing.get()
    }

    /// Replace the cached list with the backend's view of the caller's
    /// subscriptions.
    pub async fn find_all_by_user(&self, cancel: &CancellationToken) {
        let _flight = self.finding_all_by_user.begin();
        match cancellable(cancel, self.request_all()).await {
            Ok(subscriptions) => {
                info!(count = subscriptions.len(), "subscriptions: fetched");
                let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
                cache::replace_all(&mut cached.subscriptions, subscriptions);
                drop(cached);
                self.notifier.success(&FIND_ALL_BY_USER.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), FIND_ALL_BY_USER, &e),
        }
    }

    async fn request_all(&self) -> Result<Vec<Subscription>, ApiError> {
        self.http.get(api::SUBSCRIPTIONS).await?.expect_status(200)?.json()
    }

    pub async fn subscribe(&self, form: &SubscribeForm, cancel: &CancellationToken) {
        let _flight = self.subscribing.begin();
        match cancellable(cancel, self.request_subscribe(form)).await {
            Ok(subscription) => {
                info!(id = subscription.id, tier = %form.tier, "subscriptions: created");
                let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
                cache::append_if_present(&mut cached.subscriptions, subscription.clone());
                cached.subscription = Some(subscription);
                drop(cached);
                self.notifier.success(&SUBSCRIBE.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), SUBSCRIBE, &e),
        }
    }

    async fn request_subscribe(&self, form: &SubscribeForm) -> Result<Subscription, ApiError> {
        form.validate()?;
        self.http.post(api::SUBSCRIBE, form).await?.expect_status(200)?.json()
    }

    pub async fn unsubscribe(&self, id: i64, cancel: &CancellationToken) {
        let _flight = self.unsubscribing.begin();
        match cancellable(cancel, self.request_unsubscribe(id)).await {
            Ok(()) => {
                let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
                let removed = cache::remove_by_id(&mut cached.subscriptions, id);
                if cached.subscription.as_ref().is_some_and(|s| s.id == id) {
                    cached.subscription = None;
                }
                drop(cached);
                info!(id, removed, "subscriptions: cancelled");
                self.notifier.success(&UNSUBSCRIBE.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), UNSUBSCRIBE, &e),
        }
    }

    async fn request_unsubscribe(&self, id: i64) -> Result<(), ApiError> {
        self.http.delete(&api::subscription_endpoint(id)).await?.expect_status(204)?;
        Ok(())
    }
}
