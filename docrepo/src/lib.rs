//! Main docrepo crate providing a generic CRUD repository service over document databases.
//!
//! This crate is the primary entry point for users of docrepo. It re-exports the core
//! types from the sub-crates, the `Entity` derive macro and the storage backends.
//!
//! # Features
//!
//! - **Generic repository service** - One [`RepositoryService`](service::RepositoryService)
//!   gives every entity type the same CRUD and mapping operations
//! - **Object mapping** - Registered or field-by-field conversion into view models
//! - **Multiple backends** - In-memory and MongoDB collection handles behind one trait
//! - **Uniform errors** - Persistence failures surface as one internal error kind
//!
//! # Quick Start
//!
//! ```ignore
//! use docrepo::{prelude::*, memory::InMemoryStore};
//! use serde::{Serialize, Deserialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
//! pub struct User {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<DocumentKey>,
//!     pub name: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! pub struct UserVm {
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServiceError> {
//!     let store = InMemoryStore::new();
//!     let users = RepositoryService::<User, _>::from_store(&store, Arc::new(Mapper::new()));
//!
//!     let alice = users.create(User { id: None, name: "Alice".into() }).await?;
//!     let id = alice.id.map(|key| key.to_hex()).unwrap_or_default();
//!
//!     let found = users.find_by_id(&id).await?;
//!     let names = users.find_all(Filter::eq("name", "Alice")).await?;
//!     let view = users.map::<User, UserVm>(alice).await?;
//!
//!     users.clear_collection(Filter::all()).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - `mongodb` - Persistent MongoDB backend (requires the `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docrepo;

pub mod prelude;

pub use docrepo_core::{database, entity, error, filter, handle, key, mapper, service};
pub use docrepo_macros::Entity;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docrepo_memory::{InMemoryCollection, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docrepo_mongodb::{MongoDbCollection, MongoDbStore, MongoDbStoreBuilder};
}
