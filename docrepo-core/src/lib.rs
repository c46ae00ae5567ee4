//! A generic CRUD repository service over JSON document databases.
//!
//! This crate is the core of the docrepo project and provides:
//!
//! - **Entity traits** ([`entity`]) - Core traits for defining and serializing entities
//! - **Keys** ([`key`]) - Native document keys and identifier conversion
//! - **Filters** ([`filter`]) - Untyped key-value filters in MongoDB query shape
//! - **Collection handles** ([`handle`]) - Traits for implementing storage backends
//! - **Databases** ([`database`]) - Traits for handing out collection handles
//! - **Object mapping** ([`mapper`]) - Transforming objects between declared shapes
//! - **Repository service** ([`service`]) - The generic CRUD and mapping facade
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docrepo::prelude::*;
//! use docrepo::memory::InMemoryStore;
//! use serde::{Serialize, Deserialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
//! #[entity(collection = "users")]
//! pub struct User {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<DocumentKey>,
//!     pub name: String,
//! }
//!
//! let store = InMemoryStore::builder().build().await?;
//! let users = RepositoryService::<User, _>::from_store(&store, Arc::new(Mapper::new()));
//!
//! let created = users.create(User { id: None, name: "a".into() }).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docrepo_core;

pub mod database;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handle;
pub mod key;
pub mod mapper;
pub mod service;
