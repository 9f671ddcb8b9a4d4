// Integration tests against a running Firestore emulator
//
// Start the emulator and export its address before running:
//   gcloud emulators firestore start --host-port=localhost:8080
//   FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test --test firestore_emulator_test -- --ignored

use std::sync::Arc;

use docrepo::config::FirestoreConfig;
use docrepo::documents::{CollectionRepository, Condition, Fields, FirestoreBackend, OrderBy};
use docrepo::DataRepository;
use serde_json::json;
use uuid::Uuid;

/// Repository bound to a collection unique to this test run
fn emulator_repository() -> CollectionRepository {
    let host = std::env::var("FIRESTORE_EMULATOR_HOST")
        .unwrap_or_else(|_| "localhost:8080".to_string());
    let config = FirestoreConfig::for_emulator(&host, "docrepo-test");

    let backend = FirestoreBackend::from_config(&config).expect("Failed to build Firestore client");
    let collection = format!("users_{}", Uuid::new_v4().simple());

    CollectionRepository::with_collection(Arc::new(backend), &collection)
        .expect("valid collection name")
}

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
#[ignore = "Requires FIRESTORE_EMULATOR_HOST"]
async fn test_emulator_crud_lifecycle() {
    let repo = emulator_repository();

    let added = repo
        .add(fields(json!({"name": "Kat", "gender": "female"})), None)
        .await
        .unwrap();
    assert!(!added.document.id.is_empty());
    assert!(added.write_time.is_some());

    let id = added.document.id.clone();
    repo.update(fields(json!({"email": "kat@email.com"})), &id, true)
        .await
        .unwrap();

    let stored = repo.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(
        serde_json::Value::Object(stored.data),
        json!({"name": "Kat", "gender": "female", "email": "kat@email.com"})
    );

    let deleted = repo.delete(&id).await.unwrap().unwrap();
    assert_eq!(deleted.document.id, id);
    assert!(repo.get_by_id(&id).await.unwrap().is_none());
    assert!(repo.delete(&id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires FIRESTORE_EMULATOR_HOST"]
async fn test_emulator_ids_with_reserved_url_characters() {
    let repo = emulator_repository();

    repo.add(fields(json!({"name": "Hash"})), Some("a#b")).await.unwrap();
    repo.add(fields(json!({"name": "Plain"})), Some("a")).await.unwrap();

    let stored = repo.get_by_id("a#b").await.unwrap().unwrap();
    assert_eq!(stored.id, "a#b");
    assert_eq!(stored.data["name"], "Hash");

    let deleted = repo.delete("a#b").await.unwrap().unwrap();
    assert_eq!(deleted.document.id, "a#b");
    assert!(repo.get_by_id("a").await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "Requires FIRESTORE_EMULATOR_HOST"]
async fn test_emulator_filtered_query() {
    let repo = emulator_repository();

    for (id, name, gender) in [
        ("p", "Peter", "male"),
        ("g", "Gary", "male"),
        ("k", "Kat", "female"),
    ] {
        repo.add(fields(json!({"name": name, "gender": gender})), Some(id))
            .await
            .unwrap();
    }

    let males = repo
        .get(&[Condition::eq("gender", "male")], &[], None)
        .await
        .unwrap();
    assert_eq!(males.len(), 2);

    let first = repo
        .get(&[], &[OrderBy::asc("name")], Some(1))
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, "g");
}
