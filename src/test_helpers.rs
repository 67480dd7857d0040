//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::app::Fanimal;
use crate::net::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::net::types::{Shelter, Subscription, TierInfo, User};
use crate::notify::NotificationLog;
use crate::storage::MemoryStorage;

pub const BASE_URL: &str = "http://backend.test/api";

// =============================================================================
// MockTransport
// =============================================================================

type Reply = Result<ApiResponse, TransportError>;

enum Scripted {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// Transport that answers from a FIFO script and records every request.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: serde_json::Value) {
        let body = serde_json::to_vec(&body).unwrap();
        self.push(Scripted::Ready(Ok(ApiResponse::new(status, body))));
    }

    pub fn reply_raw(&self, status: u16, body: &[u8]) {
        self.push(Scripted::Ready(Ok(ApiResponse::new(status, body.to_vec()))));
    }

    pub fn reply_empty(&self, status: u16) {
        self.push(Scripted::Ready(Ok(ApiResponse::new(status, Vec::new()))));
    }

    pub fn fail(&self, error: TransportError) {
        self.push(Scripted::Ready(Err(error)));
    }

    /// Next request blocks until the returned sender fires.
    pub fn defer(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.push(Scripted::Deferred(rx));
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request recorded")
    }

    fn push(&self, scripted: Scripted) {
        self.script.lock().unwrap().push_back(scripted);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Request("deferred reply dropped".to_owned()))),
            None => Err(TransportError::Request("no scripted response".to_owned())),
        }
    }
}

pub fn ok_json(status: u16, body: &serde_json::Value) -> Reply {
    Ok(ApiResponse::new(status, serde_json::to_vec(body).unwrap()))
}

// =============================================================================
// Harness
// =============================================================================

/// A fully wired client over a scripted transport and in-memory storage.
pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub storage: Arc<MemoryStorage>,
    pub app: Fanimal,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    pub fn with_token(token: &str) -> Self {
        Self::with_storage(MemoryStorage::with_token(token))
    }

    fn with_storage(storage: MemoryStorage) -> Self {
        let transport = MockTransport::new();
        let storage = Arc::new(storage);
        let app = Fanimal::with_parts(BASE_URL, transport.clone(), storage.clone());
        Self { transport, storage, app }
    }

    pub fn notes(&self) -> &NotificationLog {
        self.app.notifications()
    }

    pub fn last_note(&self) -> String {
        self.notes().last().map(|n| n.message).unwrap_or_default()
    }
}

/// Yield until `cond` holds; false if it never does.
pub async fn eventually(cond: impl Fn() -> bool) -> bool {
    for _ in 0..1_000 {
        if cond() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    cond()
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn user(name: &str) -> User {
    User {
        id: Some(1),
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
        username: name.to_lowercase(),
        roles: Vec::new(),
    }
}

pub fn user_json(name: &str) -> serde_json::Value {
    serde_json::to_value(user(name)).unwrap()
}

pub fn shelter(id: i64, name: &str) -> Shelter {
    Shelter {
        id,
        name: name.to_owned(),
        description: format!("{name} description"),
        address: format!("{id} Shelter Lane"),
        owner: None,
    }
}

pub fn shelter_json(id: i64, name: &str) -> serde_json::Value {
    serde_json::to_value(shelter(id, name)).unwrap()
}

pub fn subscription(id: i64, shelter_id: i64) -> Subscription {
    Subscription {
        id,
        user: user("Ada"),
        shelter: shelter(shelter_id, "Happy Paws"),
        amount: None,
        start_date: None,
        end_date: None,
        tier: TierInfo::Priced { price: 9.99 },
        status: None,
    }
}

pub fn subscription_json(id: i64, shelter_id: i64) -> serde_json::Value {
    serde_json::to_value(subscription(id, shelter_id)).unwrap()
}
