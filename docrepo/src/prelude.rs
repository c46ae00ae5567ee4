//! Convenient re-exports of commonly used types from docrepo.
//!
//! ```ignore
//! use docrepo::prelude::*;
//! ```

pub use docrepo_core::{
    database::{DatabaseBuilder, DocumentDatabase},
    entity::{Entity, EntityExt},
    error::{DocumentStoreError, DocumentStoreResult, MappingError, MappingResult, ServiceError, ServiceResult},
    filter::Filter,
    handle::{CollectionHandle, DeleteSummary, ReturnDocument, UpdateOptions},
    key::{DocumentKey, KEY_FIELD, parse_key},
    mapper::{Mapper, MapperBuilder},
    service::RepositoryService,
};
pub use docrepo_macros::Entity;
