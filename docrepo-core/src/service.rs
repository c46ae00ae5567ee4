//! Generic repository service.
//!
//! [`RepositoryService`] is the uniform CRUD and mapping facade over one entity's
//! collection. Concrete resource services compose it with their own entity type:
//!
//! ```ignore
//! use docrepo::prelude::*;
//!
//! pub struct UserService<H: CollectionHandle> {
//!     repository: RepositoryService<User, H>,
//! }
//!
//! impl<H: CollectionHandle> UserService<H> {
//!     pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
//!         self.repository.find_one(Filter::eq("email", email)).await
//!     }
//! }
//! ```
//!
//! # Errors
//!
//! Every persistence failure, including a malformed identifier, is reported as
//! [`ServiceError::Internal`] carrying the original message. Mapper failures are passed
//! through as [`ServiceError::Mapping`]. A missing document is `Ok(None)`.

use serde::{Serialize, de::DeserializeOwned};
use std::{marker::PhantomData, sync::Arc};
use tracing::{debug, warn};

use crate::{
    database::DocumentDatabase,
    entity::{Entity, EntityExt},
    error::{DocumentStoreError, DocumentStoreResult, ServiceError, ServiceResult},
    filter::Filter,
    handle::{CollectionHandle, DeleteSummary, UpdateOptions},
    key::{KEY_FIELD, parse_key},
    mapper::Mapper,
};

/// CRUD and mapping facade over the collection of entity `T`.
///
/// The collection handle and mapper are injected at construction and never replaced.
///
/// # Type Parameters
///
/// * `T` - The entity type stored in the collection
/// * `H` - The collection handle type
#[derive(Debug)]
pub struct RepositoryService<T: Entity, H: CollectionHandle> {
    handle: H,
    mapper: Arc<Mapper>,
    _marker: PhantomData<T>,
}

impl<T: Entity, H: CollectionHandle> RepositoryService<T, H> {
    /// Creates a service over the given collection handle and mapper.
    pub fn new(handle: H, mapper: Arc<Mapper>) -> Self {
        Self { handle, mapper, _marker: PhantomData }
    }

    /// Returns the injected collection handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Returns the injected mapper.
    pub fn mapper(&self) -> &Arc<Mapper> {
        &self.mapper
    }

    /// Returns the model name of `T`.
    pub fn model_name(&self) -> &'static str {
        T::model_name()
    }

    /// Returns the view-model name of `T`, the model name suffixed with `Vm`.
    pub fn view_model_name(&self) -> String {
        format!("{}Vm", T::model_name())
    }

    /// Maps one object of shape `S` into shape `D`.
    pub async fn map<S, D>(&self, object: S) -> ServiceResult<D>
    where
        S: Serialize + Send + 'static,
        D: DeserializeOwned + Send + 'static,
    {
        Ok(self.mapper.map::<S, D>(object)?)
    }

    /// Maps a sequence of objects of shape `S` into shape `D`, preserving order.
    pub async fn map_array<S, D>(&self, objects: Vec<S>) -> ServiceResult<Vec<D>>
    where
        S: Serialize + Send + 'static,
        D: DeserializeOwned + Send + 'static,
    {
        Ok(self.mapper.map_array::<S, D>(objects)?)
    }

    /// Returns every entity matching `filter`; [`Filter::all`] selects the whole collection.
    pub async fn find_all(&self, filter: Filter) -> ServiceResult<Vec<T>> {
        debug!(model = T::model_name(), collection = self.handle.name(), ?filter, "find_all");

        self.try_find_all(filter)
            .await
            .map_err(|e| self.internal("find_all", e))
    }

    /// Returns the first entity matching `filter`, or `None`.
    pub async fn find_one(&self, filter: Filter) -> ServiceResult<Option<T>> {
        debug!(model = T::model_name(), collection = self.handle.name(), ?filter, "find_one");

        self.try_find_one(filter)
            .await
            .map_err(|e| self.internal("find_one", e))
    }

    /// Returns the entity with the given identifier, or `None`.
    pub async fn find_by_id(&self, id: &str) -> ServiceResult<Option<T>> {
        debug!(model = T::model_name(), collection = self.handle.name(), id, "find_by_id");

        self.try_find_by_id(id)
            .await
            .map_err(|e| self.internal("find_by_id", e))
    }

    /// Stores `item` and returns it as stored, including its generated key.
    pub async fn create(&self, item: T) -> ServiceResult<T> {
        debug!(model = T::model_name(), collection = self.handle.name(), "create");

        self.try_create(item)
            .await
            .map_err(|e| self.internal("create", e))
    }

    /// Removes the entity with the given identifier and returns it as it was, or `None`.
    pub async fn delete(&self, id: &str) -> ServiceResult<Option<T>> {
        debug!(model = T::model_name(), collection = self.handle.name(), id, "delete");

        self.try_delete(id)
            .await
            .map_err(|e| self.internal("delete", e))
    }

    /// Replaces the entity with the given identifier by `item` and returns the result.
    ///
    /// The whole document is replaced: fields absent from `item` are dropped. The stored
    /// key is kept regardless of any key carried by `item`. Returns `None` if no entity has
    /// the identifier.
    pub async fn update(&self, id: &str, item: T) -> ServiceResult<Option<T>> {
        debug!(model = T::model_name(), collection = self.handle.name(), id, "update");

        self.try_update(id, item)
            .await
            .map_err(|e| self.internal("update", e))
    }

    /// Removes every entity matching `filter`; [`Filter::all`] empties the collection.
    pub async fn clear_collection(&self, filter: Filter) -> ServiceResult<DeleteSummary> {
        debug!(model = T::model_name(), collection = self.handle.name(), ?filter, "clear_collection");

        self.handle
            .delete_many(filter)
            .await
            .map_err(|e| self.internal("clear_collection", e))
    }

    async fn try_find_all(&self, filter: Filter) -> DocumentStoreResult<Vec<T>> {
        self.handle
            .find(filter)
            .await?
            .into_iter()
            .map(T::from_document)
            .collect()
    }

    async fn try_find_one(&self, filter: Filter) -> DocumentStoreResult<Option<T>> {
        self.handle
            .find_one(filter)
            .await?
            .map(T::from_document)
            .transpose()
    }

    async fn try_find_by_id(&self, id: &str) -> DocumentStoreResult<Option<T>> {
        self.handle
            .find_by_id(parse_key(id)?)
            .await?
            .map(T::from_document)
            .transpose()
    }

    async fn try_create(&self, item: T) -> DocumentStoreResult<T> {
        T::from_document(
            self.handle
                .create(item.to_document()?)
                .await?,
        )
    }

    async fn try_delete(&self, id: &str) -> DocumentStoreResult<Option<T>> {
        self.handle
            .find_by_id_and_remove(parse_key(id)?)
            .await?
            .map(T::from_document)
            .transpose()
    }

    async fn try_update(&self, id: &str, item: T) -> DocumentStoreResult<Option<T>> {
        let key = parse_key(id)?;
        let mut replacement = item.to_document()?;
        replacement.remove(KEY_FIELD);

        self.handle
            .find_by_id_and_update(key, replacement, UpdateOptions::returning_new())
            .await?
            .map(T::from_document)
            .transpose()
    }

    fn internal(&self, operation: &'static str, err: DocumentStoreError) -> ServiceError {
        warn!(
            model = T::model_name(),
            collection = self.handle.name(),
            operation,
            error = %err,
            "persistence failure"
        );

        ServiceError::internal(err)
    }

    /// Creates a service over the collection of `T` in `database`.
    pub fn from_store<D>(database: &D, mapper: Arc<Mapper>) -> Self
    where
        D: DocumentDatabase<Handle = H>,
    {
        Self::new(database.typed_collection::<T>(), mapper)
    }
}
