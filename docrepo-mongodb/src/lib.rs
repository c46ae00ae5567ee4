//! MongoDB backend for docrepo.
//!
//! This crate provides [`MongoDbStore`], a [`DocumentDatabase`] whose collection handles
//! talk to MongoDB through the official async driver. Filters are passed to the server
//! as they are, so every MongoDB query operator is available.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docrepo = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The connection string and database name are given to the builder directly, or read
//! from the `MONGODB_URI` and `MONGODB_DATABASE` environment variables.
//!
//! # Example
//!
//! ```ignore
//! use docrepo::{database::DatabaseBuilder, mongodb::{MongoDbStore, MongoDbStoreBuilder}};
//!
//! let store = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!     .build()
//!     .await?;
//!
//! let from_env = MongoDbStoreBuilder::from_env()?.build().await?;
//! ```
//!
//! [`DocumentDatabase`]: docrepo_core::database::DocumentDatabase

#[allow(unused_extern_crates)]
extern crate self as docrepo_mongodb;

pub mod store;

pub use store::{MongoDbCollection, MongoDbStore, MongoDbStoreBuilder};
