//! In-memory storage implementation for collection handles.
//!
//! This module provides a simple in-memory backend that stores documents as BSON
//! documents in insertion order, guarded by an async-safe read-write lock.

use std::{collections::HashMap, mem, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document};
use tracing::trace;

use docrepo_core::{
    database::{DatabaseBuilder, DocumentDatabase},
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
    handle::{CollectionHandle, DeleteSummary, ReturnDocument, UpdateOptions},
    key::{DocumentKey, KEY_FIELD, document_key},
};

use crate::evaluator::DocumentEvaluator;

type CollectionDocs = Vec<Document>;
type StoreMap = HashMap<String, CollectionDocs>;


/// Thread-safe in-memory document database.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so clones and
/// every [`InMemoryCollection`] handed out by it share the same data.
///
/// # Performance
///
/// Every operation scans the collection (no indexing). For small to medium datasets this
/// is typically acceptable; use the MongoDB backend for anything larger.
///
/// # Example
///
/// ```ignore
/// use docrepo_memory::InMemoryStore;
/// use docrepo::{database::DocumentDatabase, handle::CollectionHandle};
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let users = store.collection("users");
/// let created = users.create(doc! { "name": "Alice" }).await?;
/// assert!(created.contains_key("_id"));
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> documents in insertion order
    collections: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory database.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore` with seeded collections.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

#[async_trait]
impl DocumentDatabase for InMemoryStore {
    type Handle = InMemoryCollection;

    fn collection(&self, name: &str) -> Self::Handle {
        InMemoryCollection {
            name: name.to_string(),
            collections: self.collections.clone(),
        }
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        let mut names = self.collections
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();

        Ok(names)
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        if self.collections.write().await.remove(name).is_none() {
            return Err(DocumentStoreError::CollectionNotFound(name.to_string()));
        }

        Ok(())
    }
}


/// Handle to one collection of an [`InMemoryStore`].
#[derive(Clone, Debug)]
pub struct InMemoryCollection {
    name: String,
    collections: Arc<RwLock<StoreMap>>,
}

impl InMemoryCollection {
    fn position(docs: &[Document], key: &DocumentKey) -> Option<usize> {
        let key = Bson::ObjectId(*key);

        docs.iter()
            .position(|doc| document_key(doc) == Some(&key))
    }
}

/// Puts `_id` first and copies every other field of `document` after it.
fn with_key(key: Bson, document: Document) -> Document {
    let mut stored = Document::new();
    stored.insert(KEY_FIELD, key);

    for (field, value) in document {
        if field != KEY_FIELD {
            stored.insert(field, value);
        }
    }

    stored
}

#[async_trait]
impl CollectionHandle for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, filter: Filter) -> DocumentStoreResult<Vec<Document>> {
        let collections = self.collections.read().await;

        match collections.get(&self.name) {
            Some(docs) => DocumentEvaluator::filter_documents(docs, filter.as_document()),
            None => Ok(vec![]),
        }
    }

    async fn find_one(&self, filter: Filter) -> DocumentStoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        let docs = match collections.get(&self.name) {
            Some(docs) => docs,
            None => return Ok(None),
        };

        for doc in docs {
            if DocumentEvaluator::new(doc).matches(filter.as_document())? {
                return Ok(Some(doc.clone()));
            }
        }

        Ok(None)
    }

    async fn find_by_id(&self, key: DocumentKey) -> DocumentStoreResult<Option<Document>> {
        let collections = self.collections.read().await;

        Ok(
            collections
                .get(&self.name)
                .and_then(|docs| Self::position(docs, &key).map(|i| docs[i].clone()))
        )
    }

    async fn create(&self, document: Document) -> DocumentStoreResult<Document> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .entry(self.name.clone())
            .or_default();

        let key = match document_key(&document) {
            Some(key) => {
                if docs.iter().any(|doc| document_key(doc) == Some(key)) {
                    return Err(DocumentStoreError::DocumentAlreadyExists(
                        key.to_string(),
                        self.name.clone(),
                    ));
                }
                key.clone()
            },
            None => Bson::ObjectId(DocumentKey::new()),
        };

        let stored = with_key(key, document);
        docs.push(stored.clone());

        trace!(collection = %self.name, key = ?document_key(&stored), "created document");

        Ok(stored)
    }

    async fn find_by_id_and_remove(&self, key: DocumentKey) -> DocumentStoreResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(&self.name) {
            Some(docs) => docs,
            None => return Ok(None),
        };

        Ok(Self::position(docs, &key).map(|i| docs.remove(i)))
    }

    async fn find_by_id_and_update(
        &self,
        key: DocumentKey,
        document: Document,
        options: UpdateOptions,
    ) -> DocumentStoreResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(&self.name) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        let index = match Self::position(docs, &key) {
            Some(index) => index,
            None => return Ok(None),
        };

        let replacement = with_key(Bson::ObjectId(key), document);
        let previous = mem::replace(&mut docs[index], replacement);

        Ok(Some(match options.return_document {
            ReturnDocument::Before => previous,
            ReturnDocument::After => docs[index].clone(),
        }))
    }

    async fn delete_many(&self, filter: Filter) -> DocumentStoreResult<DeleteSummary> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(&self.name) {
            Some(docs) => docs,
            None => return Ok(DeleteSummary::acknowledged(0)),
        };

        // Evaluate first so that an invalid filter leaves the collection untouched.
        let doomed = docs
            .iter()
            .map(|doc| DocumentEvaluator::new(doc).matches(filter.as_document()))
            .collect::<DocumentStoreResult<Vec<bool>>>()?;
        let deleted = doomed.iter().filter(|d| **d).count() as u64;

        let mut verdicts = doomed.into_iter();
        docs.retain(|_| !verdicts.next().unwrap_or(false));

        trace!(collection = %self.name, deleted, "deleted documents");

        Ok(DeleteSummary::acknowledged(deleted))
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// Collections can be seeded with documents; documents without `_id` get a fresh key.
///
/// # Example
///
/// ```ignore
/// use docrepo_memory::InMemoryStore;
/// use docrepo::database::DatabaseBuilder;
///
/// let store = InMemoryStore::builder()
///     .with_documents("users", vec![doc! { "name": "Alice" }])
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    seed: StoreMap,
}

impl InMemoryStoreBuilder {
    /// Seeds `collection` with `documents`, appended after any earlier seed.
    pub fn with_documents(mut self, collection: &str, documents: Vec<Document>) -> Self {
        self.seed
            .entry(collection.to_string())
            .or_default()
            .extend(documents.into_iter().map(|doc| {
                let key = document_key(&doc)
                    .cloned()
                    .unwrap_or_else(|| Bson::ObjectId(DocumentKey::new()));

                with_key(key, doc)
            }));
        self
    }
}

#[async_trait]
impl DatabaseBuilder for InMemoryStoreBuilder {
    type Database = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] holding the seeded collections.
    ///
    /// Fails with [`DocumentStoreError::DocumentAlreadyExists`] if a collection was seeded
    /// with two documents sharing a key.
    async fn build(self) -> DocumentStoreResult<Self::Database> {
        for (name, docs) in &self.seed {
            for (i, doc) in docs.iter().enumerate() {
                let key = document_key(doc);

                if docs[..i].iter().any(|earlier| document_key(earlier) == key) {
                    return Err(DocumentStoreError::DocumentAlreadyExists(
                        key.map(Bson::to_string).unwrap_or_default(),
                        name.clone(),
                    ));
                }
            }
        }

        Ok(InMemoryStore {
            collections: Arc::new(RwLock::new(self.seed)),
        })
    }
}
