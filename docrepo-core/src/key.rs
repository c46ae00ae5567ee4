//! Document keys and identifier conversion.
//!
//! Callers address documents by their external string identifier. Backends store the
//! native [`DocumentKey`] in the `_id` field. [`parse_key`] performs the conversion and
//! reports failures as a persistence error, exactly like any other backend failure.

use bson::{Bson, Document};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// The native primary key type of stored documents.
pub type DocumentKey = bson::oid::ObjectId;

/// Name of the field holding a document's primary key.
pub const KEY_FIELD: &str = "_id";

/// Converts an external string identifier into a [`DocumentKey`].
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidIdentifier`] if `id` is not a valid key.
pub fn parse_key(id: &str) -> DocumentStoreResult<DocumentKey> {
    DocumentKey::parse_str(id)
        .map_err(|e| DocumentStoreError::InvalidIdentifier(id.to_string(), e.to_string()))
}

/// Returns the key stored in a document, if it has one.
///
/// A `null` `_id`, as written by an unset `Option<DocumentKey>`, counts as no key.
pub fn document_key(document: &Document) -> Option<&Bson> {
    document
        .get(KEY_FIELD)
        .filter(|key| !matches!(key, Bson::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn parses_hex_identifiers() {
        let key = DocumentKey::new();

        assert_eq!(parse_key(&key.to_hex()).unwrap(), key);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        match parse_key("not-a-key") {
            Err(DocumentStoreError::InvalidIdentifier(id, _)) => assert_eq!(id, "not-a-key"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn reads_key_field() {
        let key = DocumentKey::new();

        assert_eq!(document_key(&doc! { "_id": key }), Some(&Bson::ObjectId(key)));
        assert_eq!(document_key(&doc! { "name": "a" }), None);
    }

    #[test]
    fn null_key_is_absent() {
        assert_eq!(document_key(&doc! { "_id": null, "name": "a" }), None);
    }
}
