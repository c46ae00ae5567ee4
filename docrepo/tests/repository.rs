use docrepo::{memory::InMemoryStore, prelude::*};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<DocumentKey>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl User {
    fn named(name: &str) -> Self {
        Self { id: None, name: name.into(), email: None }
    }

    fn key(&self) -> String {
        self.id.map(|key| key.to_hex()).unwrap_or_default()
    }
}

fn users(store: &InMemoryStore) -> RepositoryService<User, docrepo::memory::InMemoryCollection> {
    RepositoryService::from_store(store, Arc::new(Mapper::new()))
}

#[tokio::test]
async fn created_users_can_be_found_and_deleted() {
    let store = InMemoryStore::new();
    let service = users(&store);

    let created = service.create(User::named("a")).await.unwrap();
    assert!(created.id.is_some());

    let found = service.find_by_id(&created.key()).await.unwrap();
    assert_eq!(found, Some(created.clone()));

    let deleted = service.delete(&created.key()).await.unwrap();
    assert_eq!(deleted, Some(created.clone()));

    assert_eq!(service.find_by_id(&created.key()).await.unwrap(), None);
    assert_eq!(service.delete(&created.key()).await.unwrap(), None);
}

#[tokio::test]
async fn find_all_applies_the_filter() {
    let store = InMemoryStore::new();
    let service = users(&store);

    for name in ["a", "b", "a"] {
        service.create(User::named(name)).await.unwrap();
    }

    assert_eq!(service.find_all(Filter::all()).await.unwrap().len(), 3);
    assert_eq!(service.find_all(Filter::eq("name", "a")).await.unwrap().len(), 2);
    assert!(service.find_all(Filter::eq("name", "z")).await.unwrap().is_empty());
}

#[tokio::test]
async fn find_one_returns_first_match_or_none() {
    let store = InMemoryStore::new();
    let service = users(&store);

    let first = service.create(User::named("a")).await.unwrap();
    service.create(User::named("a")).await.unwrap();

    assert_eq!(service.find_one(Filter::eq("name", "a")).await.unwrap(), Some(first));
    assert_eq!(service.find_one(Filter::eq("name", "z")).await.unwrap(), None);
}

#[tokio::test]
async fn update_replaces_the_whole_document() {
    let store = InMemoryStore::new();
    let service = users(&store);

    let created = service
        .create(User { id: None, name: "a".into(), email: Some("a@example.com".into()) })
        .await
        .unwrap();

    let updated = service
        .update(&created.key(), User::named("b"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "b");
    assert_eq!(updated.email, None);
    assert_eq!(service.find_by_id(&created.key()).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn update_keeps_the_stored_key() {
    let store = InMemoryStore::new();
    let service = users(&store);

    let created = service.create(User::named("a")).await.unwrap();
    let foreign = User { id: Some(DocumentKey::new()), ..User::named("b") };

    let updated = service.update(&created.key(), foreign).await.unwrap().unwrap();

    assert_eq!(updated.id, created.id);
}

#[tokio::test]
async fn update_of_missing_user_is_none() {
    let service = users(&InMemoryStore::new());

    assert_eq!(
        service.update(&DocumentKey::new().to_hex(), User::named("a")).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn clear_collection_honours_the_filter() {
    let store = InMemoryStore::new();
    let service = users(&store);

    for name in ["a", "b", "b"] {
        service.create(User::named(name)).await.unwrap();
    }

    let summary = service.clear_collection(Filter::eq("name", "b")).await.unwrap();
    assert_eq!(summary.deleted_count, Some(2));
    assert_eq!(service.find_all(Filter::all()).await.unwrap(), vec![
        service.find_one(Filter::eq("name", "a")).await.unwrap().unwrap()
    ]);

    let summary = service.clear_collection(Filter::all()).await.unwrap();
    assert_eq!(summary, DeleteSummary::acknowledged(1));
    assert!(service.find_all(Filter::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_identifiers_are_internal_errors() {
    let service = users(&InMemoryStore::new());

    for result in [
        service.find_by_id("nope").await.map(|_| ()),
        service.delete("nope").await.map(|_| ()),
        service.update("nope", User::named("a")).await.map(|_| ()),
    ] {
        assert!(result.unwrap_err().is_internal());
    }
}

#[tokio::test]
async fn invalid_filters_are_internal_errors() {
    let service = users(&InMemoryStore::new());
    service.create(User::named("a")).await.unwrap();

    let bad = Filter::new(docrepo::bson::doc! { "name": { "$regex": "^a" } });

    assert!(service.find_all(bad.clone()).await.unwrap_err().is_internal());
    assert!(service.clear_collection(bad).await.unwrap_err().is_internal());
}

#[tokio::test]
async fn services_share_the_store() {
    let store = InMemoryStore::new();
    let writer = users(&store);
    let reader = users(&store.clone());

    let created = writer.create(User::named("a")).await.unwrap();

    assert_eq!(reader.find_by_id(&created.key()).await.unwrap(), Some(created));
    assert_eq!(store.list_collections().await.unwrap(), ["users"]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Entity)]
struct Plain {
    #[serde(rename = "_id")]
    id: Option<DocumentKey>,
    name: String,
}

#[tokio::test]
async fn unset_keys_serialized_as_null_are_generated() {
    let store = InMemoryStore::new();
    let service = RepositoryService::<Plain, _>::from_store(&store, Arc::new(Mapper::new()));

    let first = service.create(Plain { id: None, name: "a".into() }).await.unwrap();
    let second = service.create(Plain { id: None, name: "b".into() }).await.unwrap();

    assert!(first.id.is_some());
    assert!(second.id.is_some());
    assert_ne!(first.id, second.id);

    let id = first.id.map(|key| key.to_hex()).unwrap_or_default();
    assert_eq!(service.find_by_id(&id).await.unwrap(), Some(first));
}
