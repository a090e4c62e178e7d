//! In-memory storage backend.
//!
//! Documents are held as plain BSON documents in per-collection vectors
//! behind an async-safe read-write lock. Collections come into existence on
//! first insert and documents keep insertion order; selection is purely
//! filter-driven, so no identifier scheme is imposed.

use async_trait::async_trait;
use bson::{Bson, Document};
use futures::{StreamExt, stream};
use mea::rwlock::RwLock;
use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use stirrup_core::{
    backend::{DocumentStream, Filter, StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    options::{CountOptions, FindOptions, SortDirection},
};

use crate::matcher::{Comparable, FilterMatcher};

type CollectionVec = Vec<Document>;
type StoreMap = HashMap<String, CollectionVec>;

/// Thread-safe in-memory document store.
///
/// Cloneable; clones share the same underlying data through an `Arc`.
/// Queries scan the whole collection, which is fine for the test and
/// development workloads this backend is meant for.
///
/// # Example
///
/// ```ignore
/// use stirrup_memory::MemoryStore;
/// use stirrup_core::{backend::StoreBackend, options::FindOptions};
/// use bson::doc;
///
/// let store = MemoryStore::new();
/// store.insert_one(doc! { "name": "Alice" }, "users").await?;
/// let found = store.find(doc! {}, FindOptions::default(), "users").await?;
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryStore {
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing a `MemoryStore`.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder
    }

    fn sort_documents(documents: &mut [Document], field: &str, direction: SortDirection) {
        documents.sort_by(|a, b| {
            let left = FilterMatcher::lookup_path(a, field)
                .map(Comparable::from)
                .unwrap_or(Comparable::Null);
            let right = FilterMatcher::lookup_path(b, field)
                .map(Comparable::from)
                .unwrap_or(Comparable::Null);

            match direction {
                SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
            }
        });
    }

    // Set-semantics merge; dotted paths create intermediate documents.
    fn apply_set(target: &mut Document, fields: &Document) {
        for (path, value) in fields {
            Self::set_path(target, path, value.clone());
        }
    }

    fn set_path(document: &mut Document, path: &str, value: Bson) {
        match path.split_once('.') {
            None => {
                document.insert(path, value);
            }
            Some((head, rest)) => {
                if !matches!(document.get(head), Some(Bson::Document(_))) {
                    document.insert(head, Document::new());
                }
                if let Some(Bson::Document(inner)) = document.get_mut(head) {
                    Self::set_path(inner, rest, value);
                }
            }
        }
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn find(
        &self,
        filter: Filter,
        options: FindOptions,
        collection: &str,
    ) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let mut documents = match store.get(collection) {
            Some(col) => col
                .iter()
                .filter(|doc| FilterMatcher::matches(doc, &filter))
                .cloned()
                .collect::<Vec<_>>(),
            None => return Ok(vec![]),
        };

        if let Some(sort) = &options.sort {
            Self::sort_documents(&mut documents, &sort.field, sort.direction);
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = match options.limit {
            Some(limit) if limit > 0 => limit as usize,
            _ => usize::MAX,
        };

        Ok(documents
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    async fn find_one(&self, filter: Filter, collection: &str) -> StoreResult<Option<Document>> {
        let store = self.store.read().await;

        Ok(store
            .get(collection)
            .and_then(|col| {
                col.iter()
                    .find(|doc| FilterMatcher::matches(doc, &filter))
            })
            .cloned())
    }

    async fn count(
        &self,
        filter: Filter,
        options: CountOptions,
        collection: &str,
    ) -> StoreResult<u64> {
        let store = self.store.read().await;
        let matched = store
            .get(collection)
            .map(|col| {
                col.iter()
                    .filter(|doc| FilterMatcher::matches(doc, &filter))
                    .count() as u64
            })
            .unwrap_or(0);

        let counted = matched.saturating_sub(options.skip.unwrap_or(0));

        Ok(match options.limit {
            Some(limit) => counted.min(limit),
            None => counted,
        })
    }

    async fn insert_one(&self, document: Document, collection: &str) -> StoreResult<()> {
        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);

        Ok(())
    }

    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> StoreResult<()> {
        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(documents);

        Ok(())
    }

    async fn replace_one(
        &self,
        filter: Filter,
        document: Document,
        upsert: bool,
        collection: &str,
    ) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let col = store
            .entry(collection.to_string())
            .or_default();

        match col
            .iter()
            .position(|doc| FilterMatcher::matches(doc, &filter))
        {
            Some(position) => {
                col[position] = document;

                Ok(1)
            }
            None if upsert => {
                col.push(document);

                Ok(0)
            }
            None => Ok(0),
        }
    }

    async fn update_one(
        &self,
        filter: Filter,
        fields: Document,
        collection: &str,
    ) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(col) = store.get_mut(collection) else {
            return Ok(0);
        };

        match col
            .iter()
            .position(|doc| FilterMatcher::matches(doc, &filter))
        {
            Some(position) => {
                Self::apply_set(&mut col[position], &fields);

                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, filter: Filter, collection: &str) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(col) = store.get_mut(collection) else {
            return Ok(0);
        };

        match col
            .iter()
            .position(|doc| FilterMatcher::matches(doc, &filter))
        {
            Some(position) => {
                col.remove(position);

                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, filter: Filter, collection: &str) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(col) = store.get_mut(collection) else {
            return Ok(0);
        };

        let before = col.len();
        col.retain(|doc| !FilterMatcher::matches(doc, &filter));

        Ok((before - col.len()) as u64)
    }

    async fn aggregate(
        &self,
        pipeline: Vec<Document>,
        collection: &str,
    ) -> StoreResult<DocumentStream> {
        let store = self.store.read().await;
        let mut documents = store
            .get(collection)
            .cloned()
            .unwrap_or_default();
        drop(store);

        // Only the subset of stages this backend can evaluate in memory.
        for stage in &pipeline {
            let Some((name, operand)) = stage.iter().next() else {
                continue;
            };

            match (name.as_str(), operand) {
                ("$match", Bson::Document(filter)) => {
                    documents.retain(|doc| FilterMatcher::matches(doc, filter));
                }
                ("$skip", skip) => {
                    let skip = skip.as_i64().or_else(|| skip.as_i32().map(i64::from));
                    let skip = skip.unwrap_or(0).max(0) as usize;
                    documents = documents.split_off(skip.min(documents.len()));
                }
                ("$limit", limit) => {
                    let limit = limit.as_i64().or_else(|| limit.as_i32().map(i64::from));
                    documents.truncate(limit.unwrap_or(0).max(0) as usize);
                }
                (other, _) => {
                    return Err(StoreError::Query(format!(
                        "unsupported aggregation stage: {other}"
                    )));
                }
            }
        }

        Ok(stream::iter(documents.into_iter().map(Ok)).boxed())
    }
}

/// Builder for constructing [`MemoryStore`] instances.
#[derive(Default)]
pub struct MemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for MemoryStoreBuilder {
    type Backend = MemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let store = MemoryStore::new();
        store
            .insert_one(doc! { "name": "Alice" }, "users")
            .await
            .unwrap();

        let found = store
            .find(doc! { "name": "Alice" }, FindOptions::default(), "users")
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_str("name").unwrap(), "Alice");
    }

    #[tokio::test]
    async fn find_on_missing_collection_is_empty() {
        let store = MemoryStore::new();

        let found = store
            .find(doc! {}, FindOptions::default(), "nothing")
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn find_applies_sort_skip_and_limit() {
        let store = MemoryStore::new();
        store
            .insert_many(
                vec![
                    doc! { "n": 3 },
                    doc! { "n": 1 },
                    doc! { "n": 4 },
                    doc! { "n": 2 },
                ],
                "numbers",
            )
            .await
            .unwrap();

        let found = store
            .find(
                doc! {},
                FindOptions::default()
                    .sort("n", SortDirection::Asc)
                    .skip(1)
                    .limit(2),
                "numbers",
            )
            .await
            .unwrap();

        let values: Vec<i32> = found
            .iter()
            .map(|d| d.get_i32("n").unwrap())
            .collect();
        assert_eq!(values, vec![2, 3]);
    }

    #[tokio::test]
    async fn count_honors_skip_and_limit() {
        let store = MemoryStore::new();
        store
            .insert_many(
                (0..5).map(|n| doc! { "n": n }).collect(),
                "numbers",
            )
            .await
            .unwrap();

        let total = store
            .count(doc! {}, CountOptions::default(), "numbers")
            .await
            .unwrap();
        let capped = store
            .count(
                doc! {},
                CountOptions::default().skip(1).limit(2),
                "numbers",
            )
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(capped, 2);
    }

    #[tokio::test]
    async fn update_one_merges_fields() {
        let store = MemoryStore::new();
        store
            .insert_one(doc! { "id": 1, "status": "new" }, "orders")
            .await
            .unwrap();

        let matched = store
            .update_one(
                doc! { "id": 1 },
                doc! { "status": "done", "audit.by": "worker" },
                "orders",
            )
            .await
            .unwrap();
        let stored = store
            .find_one(doc! { "id": 1 }, "orders")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(matched, 1);
        assert_eq!(stored.get_str("status").unwrap(), "done");
        assert_eq!(
            FilterMatcher::lookup_path(&stored, "audit.by"),
            Some(&Bson::String("worker".to_string()))
        );
    }

    #[tokio::test]
    async fn update_one_without_match_touches_nothing() {
        let store = MemoryStore::new();
        store
            .insert_one(doc! { "id": 1, "status": "new" }, "orders")
            .await
            .unwrap();

        let matched = store
            .update_one(doc! { "id": 2 }, doc! { "status": "done" }, "orders")
            .await
            .unwrap();
        let stored = store
            .find_one(doc! { "id": 1 }, "orders")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(matched, 0);
        assert_eq!(stored.get_str("status").unwrap(), "new");
    }

    #[tokio::test]
    async fn delete_one_removes_a_single_document() {
        let store = MemoryStore::new();
        store
            .insert_many(
                vec![doc! { "status": "new" }, doc! { "status": "new" }],
                "orders",
            )
            .await
            .unwrap();

        let deleted = store
            .delete_one(doc! { "status": "new" }, "orders")
            .await
            .unwrap();
        let remaining = store
            .count(doc! {}, CountOptions::default(), "orders")
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn delete_many_reports_removed_count() {
        let store = MemoryStore::new();
        store
            .insert_many(
                vec![
                    doc! { "status": "new" },
                    doc! { "status": "done" },
                    doc! { "status": "new" },
                ],
                "orders",
            )
            .await
            .unwrap();

        let deleted = store
            .delete_many(doc! { "status": "new" }, "orders")
            .await
            .unwrap();

        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn replace_one_upserts_when_nothing_matches() {
        let store = MemoryStore::new();

        let matched = store
            .replace_one(doc! { "id": 1 }, doc! { "id": 1, "v": 2 }, true, "orders")
            .await
            .unwrap();
        let count = store
            .count(doc! {}, CountOptions::default(), "orders")
            .await
            .unwrap();

        assert_eq!(matched, 0);
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn replace_one_swaps_document_content() {
        let store = MemoryStore::new();
        store
            .insert_one(doc! { "id": 1, "v": 1, "extra": true }, "orders")
            .await
            .unwrap();

        let matched = store
            .replace_one(doc! { "id": 1 }, doc! { "id": 1, "v": 2 }, true, "orders")
            .await
            .unwrap();
        let stored = store
            .find_one(doc! { "id": 1 }, "orders")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(matched, 1);
        assert_eq!(stored.get_i32("v").unwrap(), 2);
        assert!(stored.get("extra").is_none());
    }

    #[tokio::test]
    async fn aggregate_evaluates_match_skip_and_limit() {
        let store = MemoryStore::new();
        store
            .insert_many(
                (0..6)
                    .map(|n| doc! { "n": n, "even": (n % 2 == 0) })
                    .collect(),
                "numbers",
            )
            .await
            .unwrap();

        let cursor = store
            .aggregate(
                vec![
                    doc! { "$match": { "even": true } },
                    doc! { "$skip": 1 },
                    doc! { "$limit": 1 },
                ],
                "numbers",
            )
            .await
            .unwrap();
        let documents: Vec<Document> = cursor
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].get_i32("n").unwrap(), 2);
    }

    #[tokio::test]
    async fn aggregate_rejects_unsupported_stages() {
        let store = MemoryStore::new();

        let result = store
            .aggregate(vec![doc! { "$group": { "_id": "$n" } }], "numbers")
            .await;

        assert!(matches!(result, Err(StoreError::Query(_))));
    }
}
