//! Database abstraction handing out collection handles.
//!
//! A [`DocumentDatabase`] owns the connection (or the in-memory state) and creates
//! [`CollectionHandle`]s on demand. Databases are built by a [`DatabaseBuilder`], which is
//! where backend configuration lives.
//!
//! # Example
//!
//! ```ignore
//! use docrepo::prelude::*;
//! use docrepo::memory::InMemoryStore;
//!
//! let store = InMemoryStore::builder().build().await?;
//! let users = store.typed_collection::<User>();
//! ```

use async_trait::async_trait;

use crate::{entity::Entity, error::DocumentStoreResult, handle::CollectionHandle};

/// A document database that hands out collection handles.
#[async_trait]
pub trait DocumentDatabase: Send + Sync {
    /// The handle type returned for collections of this database.
    type Handle: CollectionHandle + 'static;

    /// Returns a handle to the collection with the given name.
    ///
    /// Collections are created lazily by the first write.
    fn collection(&self, name: &str) -> Self::Handle;

    /// Returns a handle to the collection storing entities of type `T`.
    fn typed_collection<T: Entity>(&self) -> Self::Handle
    where
        Self: Sized,
    {
        self.collection(T::collection_name())
    }

    /// Lists the names of all collections.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Drops a collection and every document in it.
    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Cleanly shuts down the database, releasing connections.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Factory for database instances.
#[async_trait]
pub trait DatabaseBuilder {
    type Database: DocumentDatabase;

    async fn build(self) -> DocumentStoreResult<Self::Database>;
}
