//! Untyped filters for selecting documents.
//!
//! A [`Filter`] is a key-value mapping in MongoDB query shape: plain values match by
//! equality, operator documents (`{ "$gt": 3 }`) express comparisons, and top-level
//! `$and` / `$or` / `$nor` combine sub-filters. The empty filter matches every document.
//!
//! # Example
//!
//! ```ignore
//! use docrepo::filter::Filter;
//!
//! let adults = Filter::eq("status", "active").and(Filter::gte("age", 18));
//! let everything = Filter::all();
//! ```

use bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};

use crate::key::{DocumentKey, KEY_FIELD};

/// A key-value mapping selecting a subset of documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Document);

impl Filter {
    /// Creates a filter that matches every document.
    pub fn all() -> Self {
        Filter(Document::new())
    }

    /// Wraps an existing query document.
    pub fn new(document: Document) -> Self {
        Filter(document)
    }

    /// Matches the document with the given key.
    pub fn by_key(key: DocumentKey) -> Self {
        Filter(doc! { KEY_FIELD: key })
    }

    /// Matches documents where `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, None, value.into())
    }

    /// Matches documents where `field` does not equal `value`.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, Some("$ne"), value.into())
    }

    /// Matches documents where `field` is greater than `value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, Some("$gt"), value.into())
    }

    /// Matches documents where `field` is greater than or equal to `value`.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, Some("$gte"), value.into())
    }

    /// Matches documents where `field` is less than `value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, Some("$lt"), value.into())
    }

    /// Matches documents where `field` is less than or equal to `value`.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::field(field, Some("$lte"), value.into())
    }

    /// Matches documents where `field` equals any of `values`.
    pub fn any_of(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Self {
        Self::field(field, Some("$in"), Self::array(values))
    }

    /// Matches documents where `field` equals none of `values`.
    pub fn none_of(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Self {
        Self::field(field, Some("$nin"), Self::array(values))
    }

    /// Matches documents that have `field`.
    pub fn exists(field: impl Into<String>) -> Self {
        Self::field(field, Some("$exists"), Bson::Boolean(true))
    }

    /// Matches documents that lack `field`.
    pub fn not_exists(field: impl Into<String>) -> Self {
        Self::field(field, Some("$exists"), Bson::Boolean(false))
    }

    /// Combines this filter with another; both must match.
    ///
    /// If this filter is already an `$and`, the other filter is appended to it.
    pub fn and(self, other: Filter) -> Self {
        self.combine("$and", other)
    }

    /// Combines this filter with another; either may match.
    ///
    /// If this filter is already an `$or`, the other filter is appended to it.
    pub fn or(self, other: Filter) -> Self {
        self.combine("$or", other)
    }

    /// Returns `true` if this filter matches every document.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying query document.
    pub fn as_document(&self) -> &Document {
        &self.0
    }

    /// Consumes the filter and returns the underlying query document.
    pub fn into_document(self) -> Document {
        self.0
    }

    fn field(field: impl Into<String>, op: Option<&str>, value: Bson) -> Self {
        let condition = match op {
            Some(op) => Bson::Document(doc! { op: value }),
            None => value,
        };

        let mut document = Document::new();
        document.insert(field.into(), condition);

        Filter(document)
    }

    fn array(values: impl IntoIterator<Item = impl Into<Bson>>) -> Bson {
        Bson::Array(values.into_iter().map(Into::into).collect())
    }

    fn combine(self, op: &str, other: Filter) -> Self {
        if self.0.len() == 1 {
            if let Some(Bson::Array(list)) = self.0.get(op) {
                let mut list = list.clone();
                list.push(Bson::Document(other.0));

                return Filter(doc! { op: list });
            }
        }

        Filter(doc! { op: [Bson::Document(self.0), Bson::Document(other.0)] })
    }
}

impl From<Document> for Filter {
    fn from(document: Document) -> Self {
        Filter(document)
    }
}

impl From<Option<Filter>> for Filter {
    fn from(filter: Option<Filter>) -> Self {
        filter.unwrap_or_default()
    }
}

impl From<Filter> for Document {
    fn from(filter: Filter) -> Self {
        filter.0
    }
}
