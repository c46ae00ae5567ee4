//! Filter evaluation for in-memory documents.
//!
//! This module evaluates MongoDB-shaped filters against BSON documents. Supported are
//! plain equality (including "array contains" semantics), dotted field paths, the field
//! operators `$eq $ne $gt $gte $lt $lte $in $nin $exists`, and the top-level combinators
//! `$and $or $nor`. Anything else is rejected as an invalid filter.

use std::cmp::Ordering;
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use docrepo_core::error::{DocumentStoreError, DocumentStoreResult};


/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so that `Int32(1)` equals `Double(1.0)`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    /// Embedded documents compare field by field, in order.
    Map(Vec<(&'a str, Comparable<'a>)>),
    /// Values of other BSON types never compare equal.
    Unsupported,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect()
            ),
            _ => Comparable::Unsupported,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.bytes().partial_cmp(&b.bytes()),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Returns `true` if the document satisfies every entry of `filter`.
    pub fn matches(&self, filter: &Document) -> DocumentStoreResult<bool> {
        for (key, condition) in filter {
            let satisfied = match key.as_str() {
                "$and" => {
                    for sub in Self::sub_filters(key, condition)? {
                        if !self.matches(sub)? {
                            return Ok(false);
                        }
                    }
                    true
                },
                "$or" => self.any(Self::sub_filters(key, condition)?)?,
                "$nor" => !self.any(Self::sub_filters(key, condition)?)?,
                op if op.starts_with('$') => {
                    return Err(DocumentStoreError::InvalidFilter(format!(
                        "unsupported top-level operator {op}"
                    )));
                },
                field => Self::matches_condition(self.lookup(field).as_ref(), condition)?,
            };

            if !satisfied {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Keeps the documents matching `filter`, in their original order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        filter: &Document,
    ) -> DocumentStoreResult<Vec<Document>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).matches(filter)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }

    fn any(&self, filters: Vec<&Document>) -> DocumentStoreResult<bool> {
        for sub in filters {
            if self.matches(sub)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn sub_filters<'f>(op: &str, condition: &'f Bson) -> DocumentStoreResult<Vec<&'f Document>> {
        let invalid = || DocumentStoreError::InvalidFilter(format!("{op} expects an array of documents"));

        condition
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|sub| sub.as_document().ok_or_else(invalid))
            .collect()
    }

    /// Resolves a dotted path such as `address.city`, `tags.0` or `items.name`.
    ///
    /// A non-numeric segment applied to an array is applied to each of its elements; the
    /// values found are returned as an array, so array-contains equality matches when any
    /// element does.
    fn lookup(&self, path: &str) -> Option<Bson> {
        let segments = path.split('.').collect::<Vec<_>>();
        let (first, rest) = segments.split_first()?;

        Self::descend(self.document.get(*first)?, rest)
    }

    fn descend(value: &Bson, path: &[&str]) -> Option<Bson> {
        let Some((segment, rest)) = path.split_first() else {
            return Some(value.clone());
        };

        match value {
            Bson::Document(doc) => Self::descend(doc.get(*segment)?, rest),
            Bson::Array(arr) => match segment.parse::<usize>() {
                Ok(index) => Self::descend(arr.get(index)?, rest),
                Err(_) => {
                    let found = arr
                        .iter()
                        .filter(|item| matches!(item, Bson::Document(_)))
                        .filter_map(|item| Self::descend(item, path))
                        .collect::<Vec<_>>();

                    (!found.is_empty()).then_some(Bson::Array(found))
                },
            },
            _ => None,
        }
    }

    fn matches_condition(value: Option<&Bson>, condition: &Bson) -> DocumentStoreResult<bool> {
        match condition {
            Bson::Document(ops) if ops.keys().next().is_some_and(|k| k.starts_with('$')) => {
                for (op, operand) in ops {
                    if !Self::apply(op, value, operand)? {
                        return Ok(false);
                    }
                }

                Ok(true)
            },
            _ => Ok(Self::equals(value, condition)),
        }
    }

    /// Equality with MongoDB semantics: a missing field equals `null`, and an array field
    /// equals a value it contains.
    fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
        let expected = Comparable::from(expected);

        match value.map(Comparable::from) {
            None => expected == Comparable::Null,
            Some(Comparable::Array(items)) => {
                items.iter().any(|item| item == &expected) || Comparable::Array(items) == expected
            },
            Some(actual) => actual == expected,
        }
    }

    fn compare(value: Option<&Bson>, operand: &Bson, accept: fn(Ordering) -> bool) -> bool {
        let operand = Comparable::from(operand);
        let holds = |actual: &Comparable| actual.partial_cmp(&operand).is_some_and(accept);

        match value.map(Comparable::from) {
            None => false,
            Some(Comparable::Array(items)) => items.iter().any(holds),
            Some(actual) => holds(&actual),
        }
    }

    fn apply(op: &str, value: Option<&Bson>, operand: &Bson) -> DocumentStoreResult<bool> {
        match op {
            "$eq" => Ok(Self::equals(value, operand)),
            "$ne" => Ok(!Self::equals(value, operand)),
            "$gt" => Ok(Self::compare(value, operand, |o| o == Ordering::Greater)),
            "$gte" => Ok(Self::compare(value, operand, |o| o != Ordering::Less)),
            "$lt" => Ok(Self::compare(value, operand, |o| o == Ordering::Less)),
            "$lte" => Ok(Self::compare(value, operand, |o| o != Ordering::Greater)),
            "$in" | "$nin" => {
                let candidates = operand
                    .as_array()
                    .ok_or_else(|| DocumentStoreError::InvalidFilter(format!("{op} expects an array")))?;
                let found = candidates
                    .iter()
                    .any(|candidate| Self::equals(value, candidate));

                Ok(if op == "$in" { found } else { !found })
            },
            "$exists" => {
                let should_exist = match operand {
                    Bson::Boolean(flag) => *flag,
                    Bson::Int32(n) => *n != 0,
                    Bson::Int64(n) => *n != 0,
                    _ => return Err(DocumentStoreError::InvalidFilter("$exists expects a boolean".into())),
                };

                Ok(value.is_some() == should_exist)
            },
            other => Err(DocumentStoreError::InvalidFilter(format!("unsupported operator {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn person() -> Document {
        doc! {
            "_id": ObjectId::new(),
            "name": "ada",
            "age": 36,
            "tags": ["math", "engines"],
            "address": { "city": "London" },
        }
    }

    fn matches(filter: Document) -> bool {
        DocumentEvaluator::new(&person()).matches(&filter).unwrap()
    }

    #[test]
    fn empty_filter_matches() {
        assert!(matches(doc! {}));
    }

    #[test]
    fn equality_normalizes_numbers() {
        assert!(matches(doc! { "age": 36.0 }));
        assert!(matches(doc! { "age": 36_i64, "name": "ada" }));
        assert!(!matches(doc! { "age": 36, "name": "bob" }));
    }

    #[test]
    fn array_fields_match_contained_values() {
        assert!(matches(doc! { "tags": "math" }));
        assert!(matches(doc! { "tags": ["math", "engines"] }));
        assert!(!matches(doc! { "tags": "poetry" }));
    }

    #[test]
    fn missing_field_equals_null() {
        assert!(matches(doc! { "deleted": null }));
        assert!(!matches(doc! { "name": null }));
    }

    #[test]
    fn dotted_paths_descend() {
        assert!(matches(doc! { "address.city": "London" }));
        assert!(matches(doc! { "tags.1": "engines" }));
        assert!(!matches(doc! { "address.zip": { "$exists": true } }));
    }

    #[test]
    fn dotted_paths_fan_out_over_arrays_of_documents() {
        let order = doc! { "items": [{ "name": "a", "qty": 1 }, { "name": "b", "qty": 5 }] };
        let evaluator = DocumentEvaluator::new(&order);

        assert!(evaluator.matches(&doc! { "items.name": "a" }).unwrap());
        assert!(evaluator.matches(&doc! { "items.qty": { "$gt": 4 } }).unwrap());
        assert!(evaluator.matches(&doc! { "items.name": { "$exists": true } }).unwrap());
        assert!(!evaluator.matches(&doc! { "items.name": "c" }).unwrap());
        assert!(!evaluator.matches(&doc! { "items.name": { "$ne": "b" } }).unwrap());
        assert!(!evaluator.matches(&doc! { "items.sku": { "$exists": true } }).unwrap());
    }

    #[test]
    fn embedded_documents_compare_in_field_order() {
        assert!(matches(doc! { "address": { "city": "London" } }));

        let located = doc! { "point": { "x": 1, "y": 2 } };
        let evaluator = DocumentEvaluator::new(&located);

        assert!(evaluator.matches(&doc! { "point": { "x": 1, "y": 2 } }).unwrap());
        assert!(!evaluator.matches(&doc! { "point": { "y": 2, "x": 1 } }).unwrap());
    }

    #[test]
    fn comparison_operators() {
        assert!(matches(doc! { "age": { "$gt": 30, "$lte": 36 } }));
        assert!(!matches(doc! { "age": { "$lt": 36 } }));
        assert!(matches(doc! { "name": { "$ne": "bob" } }));
        assert!(matches(doc! { "name": { "$in": ["bob", "ada"] } }));
        assert!(matches(doc! { "tags": { "$nin": ["poetry"] } }));
    }

    #[test]
    fn combinators() {
        assert!(matches(doc! { "$or": [{ "name": "bob" }, { "age": 36 }] }));
        assert!(!matches(doc! { "$and": [{ "name": "ada" }, { "age": 1 }] }));
        assert!(matches(doc! { "$nor": [{ "name": "bob" }] }));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        let doc = person();
        let evaluator = DocumentEvaluator::new(&doc);

        assert!(matches!(
            evaluator.matches(&doc! { "name": { "$regex": "^a" } }),
            Err(DocumentStoreError::InvalidFilter(_))
        ));
        assert!(matches!(
            evaluator.matches(&doc! { "$where": "true" }),
            Err(DocumentStoreError::InvalidFilter(_))
        ));
    }
}
