//! Collection handle abstraction.
//!
//! A collection handle is the persistence layer's reference to one document collection.
//! The [`CollectionHandle`] trait is the whole surface a
//! [`RepositoryService`](crate::service::RepositoryService) needs from it: each method is
//! one request to the backend and works on untyped BSON documents.
//!
//! # Implementations
//!
//! - `docrepo_memory::InMemoryCollection` for development and tests
//! - `docrepo_mongodb::MongoDbCollection` for MongoDB
//!
//! Forwarding implementations exist for `&H`, `Arc<H>` and `Box<H>`, including
//! `dyn CollectionHandle`, so services can hold borrowed, shared or type-erased handles.

use async_trait::async_trait;
use bson::Document;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};

use crate::{error::DocumentStoreResult, filter::Filter, key::DocumentKey};

/// Which version of a document an update returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnDocument {
    /// The document as it was before the update.
    Before,
    /// The document as it is after the update.
    #[default]
    After,
}

/// Options for [`CollectionHandle::find_by_id_and_update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub return_document: ReturnDocument,
}

impl UpdateOptions {
    /// Options returning the post-update document.
    pub fn returning_new() -> Self {
        Self { return_document: ReturnDocument::After }
    }

    /// Options returning the pre-update document.
    pub fn returning_old() -> Self {
        Self { return_document: ReturnDocument::Before }
    }
}

/// Outcome of a bulk delete.
///
/// Both fields are optional because not every backend reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    /// Whether the backend acknowledged the delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged: Option<bool>,
    /// How many documents were removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
}

impl DeleteSummary {
    /// An acknowledged delete that removed `deleted_count` documents.
    pub fn acknowledged(deleted_count: u64) -> Self {
        Self {
            acknowledged: Some(true),
            deleted_count: Some(deleted_count),
        }
    }
}

/// Abstract interface to one document collection.
///
/// # Thread Safety
///
/// Implementations must be thread-safe. Consistency of concurrent writes to the same
/// document is entirely up to the backend.
///
/// # Error Handling
///
/// Operations return [`DocumentStoreResult<T>`](crate::error::DocumentStoreResult). A
/// missing document is reported as `Ok(None)`, never as an error.
#[async_trait]
pub trait CollectionHandle: Send + Sync + Debug {
    /// Returns the name of the collection.
    fn name(&self) -> &str;

    /// Returns every document matching `filter`, in storage order.
    async fn find(&self, filter: Filter) -> DocumentStoreResult<Vec<Document>>;

    /// Returns the first document matching `filter`.
    async fn find_one(&self, filter: Filter) -> DocumentStoreResult<Option<Document>>;

    /// Returns the document with the given key.
    async fn find_by_id(&self, key: DocumentKey) -> DocumentStoreResult<Option<Document>>;

    /// Stores a new document and returns it as stored.
    ///
    /// A fresh key is generated when the document has no `_id`. A document whose `_id`
    /// already exists is rejected.
    async fn create(&self, document: Document) -> DocumentStoreResult<Document>;

    /// Removes the document with the given key and returns it as it was before removal.
    async fn find_by_id_and_remove(&self, key: DocumentKey) -> DocumentStoreResult<Option<Document>>;

    /// Replaces the document with the given key by `document`, keeping its `_id`.
    ///
    /// Returns the pre- or post-update document depending on `options`, or `None` when no
    /// document has the key.
    async fn find_by_id_and_update(
        &self,
        key: DocumentKey,
        document: Document,
        options: UpdateOptions,
    ) -> DocumentStoreResult<Option<Document>>;

    /// Removes every document matching `filter`.
    async fn delete_many(&self, filter: Filter) -> DocumentStoreResult<DeleteSummary>;
}

macro_rules! forward_collection_handle {
    ($($ty:ty),+) => {$(
        #[async_trait]
        impl<H> CollectionHandle for $ty
        where
            H: CollectionHandle + ?Sized,
        {
            fn name(&self) -> &str {
                (**self).name()
            }

            async fn find(&self, filter: Filter) -> DocumentStoreResult<Vec<Document>> {
                (**self).find(filter).await
            }

            async fn find_one(&self, filter: Filter) -> DocumentStoreResult<Option<Document>> {
                (**self).find_one(filter).await
            }

            async fn find_by_id(&self, key: DocumentKey) -> DocumentStoreResult<Option<Document>> {
                (**self).find_by_id(key).await
            }

            async fn create(&self, document: Document) -> DocumentStoreResult<Document> {
                (**self).create(document).await
            }

            async fn find_by_id_and_remove(
                &self,
                key: DocumentKey,
            ) -> DocumentStoreResult<Option<Document>> {
                (**self).find_by_id_and_remove(key).await
            }

            async fn find_by_id_and_update(
                &self,
                key: DocumentKey,
                document: Document,
                options: UpdateOptions,
            ) -> DocumentStoreResult<Option<Document>> {
                (**self)
                    .find_by_id_and_update(key, document, options)
                    .await
            }

            async fn delete_many(&self, filter: Filter) -> DocumentStoreResult<DeleteSummary> {
                (**self).delete_many(filter).await
            }
        }
    )+};
}

forward_collection_handle!(&H, Arc<H>, Box<H>);
