//! Filter evaluation for in-memory document matching.
//!
//! Filters reach this backend as opaque BSON criteria mappings. Each entry
//! is either an implicit equality check or an operator document
//! (`$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`).
//! Field paths may be dotted to address nested documents.

use bson::{Bson, Document, datetime::DateTime};
use std::{cmp::Ordering, collections::HashMap};

/// Type-erased, comparable representation of BSON values.
///
/// Normalizes all numeric types to f64 so that criteria written with one
/// integer width match documents stored with another.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
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
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
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
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

pub(crate) struct FilterMatcher;

impl FilterMatcher {
    /// Whether `document` satisfies every criterion in `filter`.
    ///
    /// An empty filter matches every document.
    pub fn matches(document: &Document, filter: &Document) -> bool {
        filter
            .iter()
            .all(|(path, criterion)| {
                Self::matches_criterion(Self::lookup_path(document, path), criterion)
            })
    }

    /// Resolves a (possibly dotted) field path within a document.
    pub fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
        let mut current = document;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let value = current.get(segment)?;

            if segments.peek().is_none() {
                return Some(value);
            }

            current = value.as_document()?;
        }

        None
    }

    fn matches_criterion(value: Option<&Bson>, criterion: &Bson) -> bool {
        match criterion {
            Bson::Document(ops) if Self::is_operator_document(ops) => ops
                .iter()
                .all(|(op, operand)| Self::apply_operator(value, op, operand)),
            expected => {
                value.is_some_and(|v| Comparable::from(v) == Comparable::from(expected))
            }
        }
    }

    fn is_operator_document(criterion: &Document) -> bool {
        !criterion.is_empty()
            && criterion
                .keys()
                .all(|key| key.starts_with('$'))
    }

    fn apply_operator(value: Option<&Bson>, op: &str, operand: &Bson) -> bool {
        match op {
            "$eq" => value.is_some_and(|v| Comparable::from(v) == Comparable::from(operand)),
            // A missing field satisfies $ne and $nin, matching store semantics.
            "$ne" => !value.is_some_and(|v| Comparable::from(v) == Comparable::from(operand)),
            "$exists" => value.is_some() == operand.as_bool().unwrap_or(false),
            "$gt" | "$gte" | "$lt" | "$lte" => {
                match value.and_then(|v| {
                    Comparable::from(v).partial_cmp(&Comparable::from(operand))
                }) {
                    Some(ordering) => match op {
                        "$gt" => ordering == Ordering::Greater,
                        "$gte" => ordering != Ordering::Less,
                        "$lt" => ordering == Ordering::Less,
                        "$lte" => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    },
                    None => false,
                }
            }
            "$in" => value.is_some_and(|v| Self::in_set(v, operand)),
            "$nin" => !value.is_some_and(|v| Self::in_set(v, operand)),
            // Unknown operators match nothing rather than everything.
            _ => false,
        }
    }

    fn in_set(value: &Bson, operand: &Bson) -> bool {
        let Bson::Array(candidates) = operand else {
            return false;
        };

        candidates.iter().any(|candidate| {
            Comparable::from(value) == Comparable::from(candidate)
                || matches!(
                    value,
                    Bson::Array(items)
                        if items
                            .iter()
                            .any(|item| Comparable::from(item) == Comparable::from(candidate))
                )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(FilterMatcher::matches(&doc! { "a": 1 }, &doc! {}));
    }

    #[test]
    fn implicit_equality() {
        let document = doc! { "status": "new", "priority": 2 };

        assert!(FilterMatcher::matches(&document, &doc! { "status": "new" }));
        assert!(!FilterMatcher::matches(&document, &doc! { "status": "done" }));
        assert!(!FilterMatcher::matches(&document, &doc! { "missing": "new" }));
    }

    #[test]
    fn numeric_widths_are_normalized() {
        let document = doc! { "count": 3_i64 };

        assert!(FilterMatcher::matches(&document, &doc! { "count": 3_i32 }));
        assert!(FilterMatcher::matches(&document, &doc! { "count": 3.0 }));
    }

    #[test]
    fn dotted_paths_address_nested_documents() {
        let document = doc! { "customer": { "address": { "city": "Lisbon" } } };

        assert!(FilterMatcher::matches(
            &document,
            &doc! { "customer.address.city": "Lisbon" }
        ));
        assert!(!FilterMatcher::matches(
            &document,
            &doc! { "customer.address.zip": "1000" }
        ));
    }

    #[test]
    fn comparison_operators() {
        let document = doc! { "age": 30 };

        assert!(FilterMatcher::matches(&document, &doc! { "age": { "$gt": 18 } }));
        assert!(FilterMatcher::matches(&document, &doc! { "age": { "$gte": 30 } }));
        assert!(FilterMatcher::matches(&document, &doc! { "age": { "$lte": 30 } }));
        assert!(!FilterMatcher::matches(&document, &doc! { "age": { "$lt": 30 } }));
        assert!(!FilterMatcher::matches(
            &document,
            &doc! { "age": { "$gt": 18, "$lt": 25 } }
        ));
    }

    #[test]
    fn ne_matches_missing_fields() {
        assert!(FilterMatcher::matches(
            &doc! { "a": 1 },
            &doc! { "b": { "$ne": "x" } }
        ));
        assert!(!FilterMatcher::matches(
            &doc! { "b": "x" },
            &doc! { "b": { "$ne": "x" } }
        ));
    }

    #[test]
    fn exists_operator() {
        let document = doc! { "a": 1 };

        assert!(FilterMatcher::matches(&document, &doc! { "a": { "$exists": true } }));
        assert!(FilterMatcher::matches(&document, &doc! { "b": { "$exists": false } }));
        assert!(!FilterMatcher::matches(&document, &doc! { "b": { "$exists": true } }));
    }

    #[test]
    fn in_and_nin_operators() {
        let document = doc! { "status": "new", "tags": ["red", "blue"] };

        assert!(FilterMatcher::matches(
            &document,
            &doc! { "status": { "$in": ["new", "open"] } }
        ));
        assert!(FilterMatcher::matches(
            &document,
            &doc! { "tags": { "$in": ["blue"] } }
        ));
        assert!(FilterMatcher::matches(
            &document,
            &doc! { "status": { "$nin": ["done", "archived"] } }
        ));
        assert!(!FilterMatcher::matches(
            &document,
            &doc! { "status": { "$nin": ["new"] } }
        ));
    }

    #[test]
    fn unknown_operator_matches_nothing() {
        assert!(!FilterMatcher::matches(
            &doc! { "a": "abc" },
            &doc! { "a": { "$regex": "^a" } }
        ));
    }

    #[test]
    fn operator_document_is_distinguished_from_nested_equality() {
        let document = doc! { "meta": { "kind": "x" } };

        assert!(FilterMatcher::matches(
            &document,
            &doc! { "meta": { "kind": "x" } }
        ));
        assert!(!FilterMatcher::matches(
            &document,
            &doc! { "meta": { "kind": "y" } }
        ));
    }
}
