//! Runs against a live server when `MONGODB_URI` and `MONGODB_DATABASE` are set; every
//! test returns early otherwise.

use bson::{Bson, doc};
use docrepo_core::{
    database::{DatabaseBuilder, DocumentDatabase},
    error::DocumentStoreError,
    filter::Filter,
    handle::{CollectionHandle, DeleteSummary, UpdateOptions},
    key::{DocumentKey, KEY_FIELD},
};
use docrepo_mongodb::{MongoDbCollection, MongoDbStore, MongoDbStoreBuilder};

/// Connects and hands out a fresh collection, or `None` without a configured server.
async fn scratch() -> Option<(MongoDbStore, MongoDbCollection)> {
    let builder = MongoDbStoreBuilder::from_env().ok()?;
    let store = builder.build().await.unwrap();
    let collection = store.collection(&format!("scratch_{}", DocumentKey::new().to_hex()));

    Some((store, collection))
}

async fn cleanup(store: MongoDbStore, collection: &MongoDbCollection) {
    store.drop_collection(collection.name()).await.unwrap();
    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn create_generates_keys_and_rejects_duplicates() {
    let Some((store, items)) = scratch().await else { return };

    let created = items.create(doc! { "_id": null, "name": "a" }).await.unwrap();
    let key = created.get_object_id(KEY_FIELD).unwrap();

    assert_eq!(items.find_by_id(key).await.unwrap(), Some(created));
    assert!(matches!(
        items.create(doc! { "_id": key, "name": "b" }).await,
        Err(DocumentStoreError::DocumentAlreadyExists(_, _))
    ));

    cleanup(store, &items).await;
}

#[tokio::test]
async fn update_replaces_and_keeps_the_key() {
    let Some((store, items)) = scratch().await else { return };

    let created = items.create(doc! { "name": "a", "qty": 1 }).await.unwrap();
    let key = created.get_object_id(KEY_FIELD).unwrap();

    let before = items
        .find_by_id_and_update(
            key,
            doc! { "_id": DocumentKey::new(), "name": "b" },
            UpdateOptions::returning_old(),
        )
        .await
        .unwrap();
    let after = items
        .find_by_id_and_update(key, doc! { "name": "c" }, UpdateOptions::returning_new())
        .await
        .unwrap();

    assert_eq!(before, Some(created));
    assert_eq!(after, Some(doc! { "_id": key, "name": "c" }));
    assert_eq!(
        items
            .find_by_id_and_update(DocumentKey::new(), doc! {}, UpdateOptions::default())
            .await
            .unwrap(),
        None
    );

    cleanup(store, &items).await;
}

#[tokio::test]
async fn delete_many_reports_the_count() {
    let Some((store, items)) = scratch().await else { return };

    for name in ["a", "b", "b"] {
        items.create(doc! { "name": name }).await.unwrap();
    }

    assert_eq!(
        items.delete_many(Filter::eq("name", "b")).await.unwrap(),
        DeleteSummary::acknowledged(2)
    );
    assert_eq!(items.find(Filter::all()).await.unwrap().len(), 1);

    let remaining = items.find_one(Filter::all()).await.unwrap().unwrap();
    let key = remaining.get_object_id(KEY_FIELD).unwrap();

    assert_eq!(items.find_by_id_and_remove(key).await.unwrap(), Some(remaining));
    assert_eq!(items.find_by_id_and_remove(key).await.unwrap(), None);
    assert!(matches!(
        items.find_one(Filter::new(doc! { "$bogus": Bson::Null })).await,
        Err(DocumentStoreError::Backend(_))
    ));

    cleanup(store, &items).await;
}
