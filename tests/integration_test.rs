use crud_sync::config::ApiConfig;
use crud_sync::lifecycle::SyncSystem;
use crud_sync::mock::MockTransport;
use crud_sync::state::{is_fetching, is_fetching_initial, last_updated_at};
use crud_sync::sync::{CrudError, FetchOptions, Record, WriteOptions};
use crud_sync::transport::{Method, Requester};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record must be an object")
}

/// Full round trip: fetch, optimistic create, server update, delete, with the store
/// actor folding every transition.
#[tokio::test]
async fn test_full_sync_system_integration() {
    let mock = MockTransport::new();
    let system = SyncSystem::new(mock.clone(), ApiConfig::default(), ["photos"]);

    // Initial state
    let state = system.state("photos").await.unwrap().expect("photos registered");
    assert!(!is_fetching(&state));
    assert!(state.items.is_empty());

    // Fetch
    mock.expect(Method::Get, "photos").respond_json(
        200,
        json!({ "photos": [
            { "id": 1, "title": "Dunes", "album_id": 3 },
            { "id": 2, "title": "Lagoon", "album_id": 3 }
        ] }),
    );
    let records = system.fetch("photos", FetchOptions::default()).await.unwrap();
    assert_eq!(records.len(), 2);

    let state = system.state("photos").await.unwrap().unwrap();
    assert!(!is_fetching(&state));
    assert!(!is_fetching_initial(&state));
    assert!(last_updated_at(&state).is_some());
    assert_eq!(state.item("1").unwrap()["albumId"], json!(3));

    // Create with a client id, reconciled to the server id
    mock.expect(Method::Post, "photos")
        .respond_json(201, json!({ "photo": { "id": 3, "title": "Reef", "album_id": 3 } }));
    let draft = record(json!({ "id": "tmp-1", "title": "Reef", "albumId": 3 }));
    let saved = system.create("photos", draft, WriteOptions::default()).await.unwrap();
    assert_eq!(saved["id"], json!(3));

    let state = system.state("photos").await.unwrap().unwrap();
    assert!(state.item("tmp-1").is_none());
    assert_eq!(state.item("3").unwrap()["title"], json!("Reef"));
    assert!(state.pending.is_empty());

    // Update
    mock.expect(Method::Put, "photos/1")
        .respond_json(200, json!({ "photo": { "id": 1, "title": "Dunes at dusk", "album_id": 3 } }));
    system
        .update(
            "photos",
            record(json!({ "id": 1, "title": "Dunes at dusk" })),
            WriteOptions::new().with_path("photos/1"),
        )
        .await
        .unwrap();
    let state = system.state("photos").await.unwrap().unwrap();
    assert_eq!(state.item("1").unwrap()["title"], json!("Dunes at dusk"));

    // Delete
    mock.expect(Method::Delete, "photos/2").respond_status(204);
    system
        .destroy(
            "photos",
            record(json!({ "id": 2 })),
            WriteOptions::new().with_path("photos/2"),
        )
        .await
        .unwrap();
    let state = system.state("photos").await.unwrap().unwrap();
    assert_eq!(state.items.keys().collect::<Vec<_>>(), vec!["1", "3"]);

    mock.verify();
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_failed_writes_leave_state_consistent() {
    let mock = MockTransport::new();
    let system = SyncSystem::new(mock.clone(), ApiConfig::default(), ["photos"]);

    // A rejected create rolls back its optimistic insert.
    mock.expect(Method::Post, "photos")
        .respond_json(422, json!({ "errors": { "title": ["can't be blank"] } }));
    let err = system
        .create("photos", record(json!({ "id": "tmp-1", "title": "" })), WriteOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_errors().and_then(|e| e.get("title")),
        Some("can't be blank")
    );
    let state = system.state("photos").await.unwrap().unwrap();
    assert!(state.items.is_empty());
    assert!(state.pending.is_empty());

    // A local record survives a failed delete.
    system
        .create("photos", record(json!({ "id": 9, "title": "Kept" })), WriteOptions::local_only())
        .await
        .unwrap();
    let state = system.state("photos").await.unwrap().unwrap();
    assert!(state.item("9").is_some());
    assert_eq!(state.pending("9"), None);

    mock.expect(Method::Delete, "photos").fail_network("connection reset");
    let err = system
        .destroy("photos", record(json!({ "id": 9 })), WriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CrudError::Transport(_)));

    let state = system.state("photos").await.unwrap().unwrap();
    assert!(state.item("9").is_some());
    assert!(state.pending.is_empty());

    // Fetch errors land in meta.
    mock.expect(Method::Get, "photos").respond_status(503);
    system.fetch("photos", FetchOptions::default()).await.unwrap_err();
    let state = system.state("photos").await.unwrap().unwrap();
    assert_eq!(state.meta.error.as_ref().map(|e| e.status), Some(503));
    assert!(!state.meta.is_fetching);

    mock.verify();
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_forbidden_redirects_to_login() {
    let mock = MockTransport::new();
    mock.expect(Method::Get, "photos").respond_status(403);

    let redirects = Arc::new(AtomicUsize::new(0));
    let seen = redirects.clone();
    let config = ApiConfig::default().with_login_url("/session/new");
    let requester = Requester::new(mock.clone(), config).on_forbidden(move |url| {
        assert_eq!(url, "/session/new");
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let system = SyncSystem::from_requester(requester, ["photos"]);

    let err = system.fetch("photos", FetchOptions::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(redirects.load(Ordering::SeqCst), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_fetches_through_store() {
    let mock = MockTransport::new();
    let system = SyncSystem::new(mock.clone(), ApiConfig::default(), ["somePhotos"]);
    mock.expect(Method::Get, "some_photos")
        .respond_json(200, json!({ "somePhotos": [{ "id": 1 }] }));
    mock.pause();

    let first = system.fetch("somePhotos", FetchOptions::default());
    let second = system.fetch("somePhotos", FetchOptions::default());
    let release = async {
        tokio::task::yield_now().await;
        let state = system.state("somePhotos").await.unwrap().unwrap();
        assert!(is_fetching_initial(&state));
        mock.release();
    };
    let (first, second, ()) = tokio::join!(first, second, release);

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(mock.calls().len(), 1);
    let state = system.state("somePhotos").await.unwrap().unwrap();
    assert!(!is_fetching(&state));
    assert!(state.item("1").is_some());

    system.shutdown().await.unwrap();
}
