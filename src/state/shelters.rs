//! Shelter cache and CRUD operations over `/shelters`.

#[cfg(test)]
#[path = "shelters_test.rs"]
mod shelters_test;

use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::flight::InFlight;
use super::{cache, cancellable, report_failure};
use crate::forms::ShelterForm;
use crate::net::api;
use crate::net::error::ApiError;
use crate::net::http::HttpClient;
use crate::net::types::Shelter;
use crate::notify::{Notifier, OpLabel};

const FIND_ALL: OpLabel = OpLabel::new("Find all", "find all");
const FIND_BY_ID: OpLabel = OpLabel::new("Find by ID", "find by ID");
const CREATE: OpLabel = OpLabel::new("Create", "create");
const UPDATE: OpLabel = OpLabel::new("Update", "update");
const DELETE: OpLabel = OpLabel::new("Delete", "delete");

#[derive(Debug, Default)]
struct Cached {
    shelters: Option<Vec<Shelter>>,
    shelter: Option<Shelter>,
}

pub struct ShelterStore {
    http: Arc<HttpClient>,
    notifier: Arc<dyn Notifier>,
    cached: RwLock<Cached>,
    finding_all: InFlight,
    finding_by_id: InFlight,
    creating: InFlight,
    updating: InFlight,
    deleting: InFlight,
}

impl ShelterStore {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http,
            notifier,
            cached: RwLock::new(Cached::default()),
            finding_all: InFlight::new(),
            finding_by_id: InFlight::new(),
            creating: InFlight::new(),
            updating: InFlight::new(),
            deleting: InFlight::new(),
        }
    }

    /// Last fetched list, `None` until the first successful `find_all`.
    #[must_use]
    pub fn shelters(&self) -> Option<Vec<Shelter>> {
        self.read(|c| c.shelters.clone())
    }

    /// Currently viewed shelter.
    #[must_use]
    pub fn shelter(&self) -> Option<Shelter> {
        self.read(|c| c.shelter.clone())
    }

    #[must_use]
    pub fn is_finding_all(&self) -> bool {
        self.finding_all.get()
    }

    #[must_use]
    pub fn is_finding_by_id(&self) -> bool {
        self.finding_by_id.get()
    }

    #[must_use]
    pub fn is_creating(&self) -> bool {
        self.creating.get()
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.updating.get()
    }

    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.deleting.get()
    }

    fn read<T>(&self, f: impl FnOnce(&Cached) -> T) -> T {
        f(&self.cached.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self, f: impl FnOnce(&mut Cached)) {
        f(&mut self.cached.write().unwrap_or_else(PoisonError::into_inner));
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    pub async fn find_all(&self, cancel: &CancellationToken) {
        let _flight = self.finding_all.begin();
        match cancellable(cancel, self.request_all()).await {
            Ok(shelters) => {
                info!(count = shelters.len(), "shelters: fetched");
                self.write(|c| cache::replace_all(&mut c.shelters, shelters));
                self.notifier.success(&FIND_ALL.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), FIND_ALL, &e),
        }
    }

    async fn request_all(&self) -> Result<Vec<Shelter>, ApiError> {
        self.http.get(api::SHELTERS).await?.expect_status(200)?.json()
    }

    /// Fetch one shelter into the detail slot. The list is not touched.
    pub async fn find_by_id(&self, id: i64, cancel: &CancellationToken) {
        let _flight = self.finding_by_id.begin();
        match cancellable(cancel, self.request_one(id)).await {
            Ok(shelter) => {
                info!(id, "shelters: fetched one");
                self.write(|c| c.shelter = Some(shelter));
                self.notifier.success(&FIND_BY_ID.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), FIND_BY_ID, &e),
        }
    }

    async fn request_one(&self, id: i64) -> Result<Shelter, ApiError> {
        self.http.get(&api::shelter_endpoint(id)).await?.expect_status(200)?.json()
    }

    /// Create a shelter and append it to a list already in memory.
    pub async fn create(&self, form: &ShelterForm, cancel: &CancellationToken) {
        let _flight = self.creating.begin();
        match cancellable(cancel, self.request_create(form)).await {
            Ok(shelter) => {
                info!(id = shelter.id, "shelters: created");
                self.write(|c| cache::append_if_present(&mut c.shelters, shelter));
                self.notifier.success(&CREATE.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), CREATE, &e),
        }
    }

    async fn request_create(&self, form: &ShelterForm) -> Result<Shelter, ApiError> {
        form.validate()?;
        self.http.post(api::SHELTERS, form).await?.expect_status(201)?.json()
    }

    /// Update a shelter and swap the returned record into the list by its id.
    pub async fn update(&self, id: i64, form: &ShelterForm, cancel: &CancellationToken) {
        let _flight = self.updating.begin();
        match cancellable(cancel, self.request_update(id, form)).await {
            Ok(shelter) => {
                self.write(|c| {
                    let replaced = cache::replace_matching(&mut c.shelters, &shelter);
                    info!(id = shelter.id, replaced, "shelters: updated");
                });
                self.notifier.success(&UPDATE.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), UPDATE, &e),
        }
    }

    async fn request_update(&self, id: i64, form: &ShelterForm) -> Result<Shelter, ApiError> {
        form.validate()?;
        self.http.put(&api::shelter_endpoint(id), form).await?.expect_status(200)?.json()
    }

    pub async fn delete_by_id(&self, id: i64, cancel: &CancellationToken) {
        let _flight = self.deleting.begin();
        match cancellable(cancel, self.request_delete(id)).await {
            Ok(()) => {
                self.write(|c| {
                    let removed = cache::remove_by_id(&mut c.shelters, id);
                    info!(id, removed, "shelters: deleted");
                });
                self.notifier.success(&DELETE.succeeded());
            }
            Err(e) => report_failure(self.notifier.as_ref(), DELETE, &e),
        }
    }

    async fn request_delete(&self, id: i64) -> Result<(), ApiError> {
        self.http.delete(&api::shelter_endpoint(id)).await?.expect_status(204)?;
        Ok(())
    }
}
