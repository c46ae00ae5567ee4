//! In-memory document storage backend for docrepo.
//!
//! This crate provides [`InMemoryStore`], a thread-safe [`DocumentDatabase`] that keeps
//! every collection in process memory. It uses async-aware read-write locks for
//! concurrent access and is meant for development and tests.
//!
//! Filters are evaluated locally and support a subset of the MongoDB query language:
//! equality, dotted paths, `$eq $ne $gt $gte $lt $lte $in $nin $exists` and the
//! `$and $or $nor` combinators.
//!
//! # Quick Start
//!
//! ```ignore
//! use docrepo::prelude::*;
//! use docrepo::memory::InMemoryStore;
//!
//! let store = InMemoryStore::builder().build().await?;
//! let users = RepositoryService::<User, _>::from_store(&store, Arc::new(Mapper::new()));
//!
//! let alice = users.create(User { id: None, name: "Alice".into() }).await?;
//! ```
//!
//! [`DocumentDatabase`]: docrepo_core::database::DocumentDatabase

#[allow(unused_extern_crates)]
extern crate self as docrepo_memory;

pub mod store;
mod evaluator;

pub use store::{InMemoryCollection, InMemoryStore, InMemoryStoreBuilder};
