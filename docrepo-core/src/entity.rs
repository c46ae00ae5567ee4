//! Core traits for entity representation and serialization.
//!
//! An entity is any serde-serializable type stored as one document in one collection.
//! Its primary key lives in the `_id` field; entities usually model it as
//! `Option<DocumentKey>` so that the database can generate it on creation.

use bson::{Document, de::deserialize_from_document, ser::serialize_to_document};
use serde::{Deserialize, Serialize};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Core trait that all entities managed by a repository service must implement.
///
/// # Deriving
///
/// `#[derive(Entity)]` from the `docrepo` crate implements this trait, taking the collection
/// name from `#[entity(collection = "...")]` or pluralizing the lowercased type name.
///
/// # Example
///
/// ```ignore
/// use docrepo::entity::Entity;
/// use docrepo::key::DocumentKey;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<DocumentKey>,
///     pub name: String,
/// }
///
/// impl Entity for User {
///     fn collection_name() -> &'static str {
///         "users"
///     }
/// }
/// ```
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this entity is stored in.
    fn collection_name() -> &'static str;

    /// Returns the model name of this entity, used to derive view-model names.
    ///
    /// Defaults to the unqualified type name.
    fn model_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);

        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Extension trait providing conversion utilities for entities.
///
/// Automatically implemented for every [`Entity`].
pub trait EntityExt: Entity {
    /// Converts this entity into a BSON document for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the entity does not serialize to a document.
    fn to_document(&self) -> DocumentStoreResult<Document>;

    /// Builds an entity from a stored BSON document.
    fn from_document(document: Document) -> DocumentStoreResult<Self>;
}

impl<E: Entity> EntityExt for E {
    fn to_document(&self) -> DocumentStoreResult<Document> {
        serialize_to_document(self).map_err(|e| {
            DocumentStoreError::InvalidDocument(format!("{}: {}", E::model_name(), e))
        })
    }

    fn from_document(document: Document) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_document(document)?)
    }
}
