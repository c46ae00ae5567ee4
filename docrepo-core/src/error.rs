//! Error types and result types for repository and persistence operations.
//!
//! Three layers of errors exist:
//!
//! - [`DocumentStoreError`] is raised by collection handles and databases.
//! - [`MappingError`] is raised by the [`Mapper`](crate::mapper::Mapper).
//! - [`ServiceError`] is what callers of a
//!   [`RepositoryService`](crate::service::RepositoryService) see. Persistence failures are
//!   flattened into [`ServiceError::Internal`], mapper failures pass through unchanged.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document database.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between BSON and entities.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during database initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given key already exists in the collection.
    /// The first argument is the document key, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The requested collection does not exist in the database.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The document is not a BSON document or has an invalid structure.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The filter uses an operator or operand the backend cannot evaluate.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    /// An external identifier could not be converted into a document key.
    /// The first argument is the identifier, the second the conversion failure.
    #[error("Invalid identifier {0}: {1}")]
    InvalidIdentifier(String, String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for persistence operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

/// Errors raised while transforming an object from one shape into another.
#[derive(Error, Debug)]
pub enum MappingError {
    /// The source could not be serialized or the destination could not be built from it.
    #[error("Mapping {source_type} -> {destination_type} failed: {message}")]
    Serialization {
        source_type: &'static str,
        destination_type: &'static str,
        message: String,
    },
    /// A registered conversion received or produced a value of an unexpected type.
    #[error("Mapping {source_type} -> {destination_type} produced a value of the wrong type")]
    TypeMismatch {
        source_type: &'static str,
        destination_type: &'static str,
    },
}

/// A specialized `Result` type for mapper operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// The errors a repository service reports to its callers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Any persistence-layer failure. Only the original message survives.
    #[error("Internal server error: {message}")]
    Internal { message: String },
    /// A mapper failure, propagated unchanged.
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl ServiceError {
    /// Builds an internal error from any displayable failure.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ServiceError::Internal { message: err.to_string() }
    }

    /// Returns `true` for [`ServiceError::Internal`].
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Internal { .. })
    }
}

/// A specialized `Result` type for repository service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_keeps_only_the_message() {
        let err = ServiceError::internal(DocumentStoreError::Backend("connection reset".into()));

        match &err {
            ServiceError::Internal { message } => {
                assert_eq!(message, "Backend error: connection reset");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.is_internal());
        assert_eq!(err.to_string(), "Internal server error: Backend error: connection reset");
    }

    #[test]
    fn mapping_error_is_transparent() {
        let err: ServiceError = MappingError::TypeMismatch {
            source_type: "A",
            destination_type: "B",
        }
        .into();

        assert!(!err.is_internal());
        assert_eq!(err.to_string(), "Mapping A -> B produced a value of the wrong type");
    }
}
