use serde_json::json;

use super::*;
use crate::net::transport::TransportError;
use crate::test_helpers::{Harness, eventually, ok_json, shelter, shelter_json};

fn form(name: &str) -> ShelterForm {
    ShelterForm { name: name.into(), description: "Dogs and cats".into(), address: "1 Main St".into() }
}

async fn seeded(h: &Harness, ids: &[i64]) {
    let list: Vec<_> = ids.iter().map(|&id| shelter_json(id, &format!("S{id}"))).collect();
    h.transport.reply(200, json!(list));
    h.app.shelters().find_all(&CancellationToken::new()).await;
}

#[tokio::test]
async fn find_all_replaces_collection() {
    let h = Harness::new();
    seeded(&h, &[1, 2]).await;
    h.transport.reply(200, json!([shelter_json(3, "S3")]));

    h.app.shelters().find_all(&CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters(), Some(vec![shelter(3, "S3")]));
    assert_eq!(h.last_note(), "Find all successful!");
    assert_eq!(h.transport.last_request().path, "/shelters");
}

#[tokio::test]
async fn find_all_accepts_string_ids() {
    let h = Harness::new();
    h.transport
        .reply(200, json!([{ "id": "7", "name": "S7", "description": "7 desc", "address": "7 Lane" }]));

    h.app.shelters().find_all(&CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters().unwrap()[0].id, 7);
}

#[tokio::test]
async fn find_all_failure_keeps_cache() {
    let h = Harness::new();
    seeded(&h, &[1]).await;
    h.transport.fail(TransportError::Timeout);

    h.app.shelters().find_all(&CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters(), Some(vec![shelter(1, "S1")]));
    assert_eq!(h.last_note(), "Unable to find all: request timed out");
    assert!(!h.app.shelters().is_finding_all());
}

#[tokio::test]
async fn find_by_id_sets_detail_only() {
    let h = Harness::new();
    seeded(&h, &[1, 2]).await;
    h.transport.reply(200, shelter_json(2, "Detail"));

    h.app.shelters().find_by_id(2, &CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelter(), Some(shelter(2, "Detail")));
    assert_eq!(h.app.shelters().shelters(), Some(vec![shelter(1, "S1"), shelter(2, "S2")]));
    assert_eq!(h.transport.last_request().path, "/shelters/2");
    assert_eq!(h.last_note(), "Find by ID successful!");
}

#[tokio::test]
async fn find_by_id_not_found_notifies() {
    let h = Harness::new();
    h.transport.reply(404, json!({ "message": "Shelter not found" }));

    h.app.shelters().find_by_id(9, &CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelter(), None);
    assert_eq!(h.last_note(), "Unable to find by ID: HTTP 404: Shelter not found");
}

#[tokio::test]
async fn create_on_null_collection_leaves_it_null() {
    let h = Harness::new();
    h.transport.reply(201, shelter_json(5, "New"));

    h.app.shelters().create(&form("New"), &CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters(), None);
    assert_eq!(h.last_note(), "Create successful!");
    let req = h.transport.last_request();
    assert_eq!(req.path, "/shelters");
    assert_eq!(req.body.unwrap()["name"], "New");
}

#[tokio::test]
async fn create_appends_to_present_collection() {
    let h = Harness::new();
    seeded(&h, &[1]).await;
    h.transport.reply(201, shelter_json(5, "New"));

    h.app.shelters().create(&form("New"), &CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters(), Some(vec![shelter(1, "S1"), shelter(5, "New")]));
}

#[tokio::test]
async fn create_with_200_is_a_failure() {
    let h = Harness::new();
    seeded(&h, &[1]).await;
    h.transport.reply(200, shelter_json(5, "New"));

    h.app.shelters().create(&form("New"), &CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters().unwrap().len(), 1);
    assert_eq!(h.last_note(), "Create failed.");
}

#[tokio::test]
async fn create_rejects_invalid_form_locally() {
    let h = Harness::new();
    let long = ShelterForm { name: "x".repeat(101), ..form("ok") };

    h.app.shelters().create(&long, &CancellationToken::new()).await;

    assert!(h.transport.requests().is_empty());
    assert!(h.last_note().contains("Name cannot exceed 100 characters"));
    assert!(!h.app.shelters().is_creating());
}

#[tokio::test]
async fn update_replaces_only_matching_entry() {
    let h = Harness::new();
    seeded(&h, &[1, 2]).await;
    let first = h.app.shelters().shelters().unwrap()[0].clone();
    h.transport.reply(200, shelter_json(2, "X"));

    h.app.shelters().update(2, &form("X"), &CancellationToken::new()).await;

    let shelters = h.app.shelters().shelters().unwrap();
    assert_eq!(shelters.len(), 2);
    assert_eq!(shelters[0], first);
    assert_eq!(shelters[1].id, 2);
    assert_eq!(shelters[1].name, "X");
    assert_eq!(h.transport.last_request().path, "/shelters/2");
    assert_eq!(h.last_note(), "Update successful!");
}

#[tokio::test]
async fn update_failure_leaves_collection() {
    let h = Harness::new();
    seeded(&h, &[1, 2]).await;
    h.transport.reply(403, json!({ "message": "Not your shelter" }));

    h.app.shelters().update(2, &form("X"), &CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters().unwrap()[1].name, "S2");
    assert_eq!(h.last_note(), "Unable to update: HTTP 403: Not your shelter");
}

#[tokio::test]
async fn delete_removes_one_and_keeps_order() {
    let h = Harness::new();
    seeded(&h, &[1, 2, 3, 4]).await;
    h.transport.reply_empty(204);

    h.app.shelters().delete_by_id(2, &CancellationToken::new()).await;

    let ids: Vec<i64> = h.app.shelters().shelters().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert_eq!(h.last_note(), "Delete successful!");
}

#[tokio::test]
async fn delete_with_200_is_a_failure() {
    let h = Harness::new();
    seeded(&h, &[1, 2]).await;
    h.transport.reply(200, json!({}));

    h.app.shelters().delete_by_id(2, &CancellationToken::new()).await;

    assert_eq!(h.app.shelters().shelters().unwrap().len(), 2);
    assert_eq!(h.last_note(), "Delete failed.");
}

#[tokio::test]
async fn unauthorized_delete_navigates_home() {
    let h = Harness::with_token("stale");
    h.transport.reply(401, json!({ "message": "expired" }));

    h.app.shelters().delete_by_id(2, &CancellationToken::new()).await;

    assert_eq!(h.app.navigator().navigations(), 1);
    assert_eq!(h.app.navigator().location(), "/");
    assert_eq!(h.app.session().token(), None);
    assert_eq!(h.last_note(), "Unable to delete: unauthorized: expired");
}

#[tokio::test]
async fn every_flag_is_set_only_while_pending() {
    let h = Harness::new();
    let store = h.app.shelters();
    let cancel = CancellationToken::new();
    let body = form("X");

    let reply = h.transport.defer();
    tokio::join!(store.find_all(&cancel), async move {
        assert!(eventually(|| store.is_finding_all()).await);
        assert!(reply.send(ok_json(200, &json!([shelter_json(1, "S1")]))).is_ok());
    });
    assert!(!store.is_finding_all());

    let reply = h.transport.defer();
    tokio::join!(store.find_by_id(1, &cancel), async move {
        assert!(eventually(|| store.is_finding_by_id()).await);
        assert!(reply.send(ok_json(200, &shelter_json(1, "S1"))).is_ok());
    });
    assert!(!store.is_finding_by_id());

    let reply = h.transport.defer();
    tokio::join!(store.create(&body, &cancel), async move {
        assert!(eventually(|| store.is_creating()).await);
        assert!(reply.send(ok_json(201, &shelter_json(2, "X"))).is_ok());
    });
    assert!(!store.is_creating());

    let reply = h.transport.defer();
    tokio::join!(store.update(2, &body, &cancel), async move {
        assert!(eventually(|| store.is_updating()).await);
        assert!(!store.is_creating());
        assert!(reply.send(Err(TransportError::Timeout)).is_ok());
    });
    assert!(!store.is_updating());

    let reply = h.transport.defer();
    tokio::join!(store.delete_by_id(2, &cancel), async move {
        assert!(eventually(|| store.is_deleting()).await);
        assert!(reply.send(ok_json(204, &json!(null))).is_ok());
    });
    assert!(!store.is_deleting());
    assert_eq!(store.shelters(), Some(vec![shelter(1, "S1")]));
}

#[tokio::test]
async fn cancelled_find_all_applies_nothing() {
    let h = Harness::new();
    let store = h.app.shelters();
    let cancel = CancellationToken::new();
    let reply = h.transport.defer();

    tokio::join!(store.find_all(&cancel), async {
        assert!(eventually(|| store.is_finding_all()).await);
        cancel.cancel();
    });
    // A late response has nowhere to land.
    let _ = reply.send(ok_json(200, &json!([shelter_json(1, "S1")])));

    assert!(!store.is_finding_all());
    assert_eq!(store.shelters(), None);
    assert!(h.notes().snapshot().is_empty());
}

#[tokio::test]
async fn already_cancelled_token_skips_request_outcome() {
    let h = Harness::new();
    seeded(&h, &[1]).await;
    h.notes().drain();
    let cancel = CancellationToken::new();
    cancel.cancel();

    h.app.shelters().delete_by_id(1, &cancel).await;

    assert_eq!(h.app.shelters().shelters(), Some(vec![shelter(1, "S1")]));
    assert!(h.notes().snapshot().is_empty());
    assert!(!h.app.shelters().is_deleting());
}
