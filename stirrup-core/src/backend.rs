//! Storage backend abstraction for the repository layer.
//!
//! The [`StoreBackend`] trait is the seam between the generic repository and
//! a concrete document store. Implementations receive filters and documents
//! verbatim and address a named collection per call; collection bindings,
//! entity (de)serialization and error-tier policy all live above this trait.
//!
//! Every method is an async fn. Cancellation is the caller's concern: the
//! surrounding execution environment may drop the future or race it against
//! a timeout, and the backend performs no internal threading or batching of
//! its own. Implementations must be safe for concurrent use from multiple
//! repository instances; connection pooling, if any, belongs to the driver.

use async_trait::async_trait;
use bson::Document;
use futures::stream::BoxStream;
use std::fmt::Debug;

use crate::{
    error::StoreResult,
    options::{CountOptions, FindOptions},
};

/// A criteria mapping used to select matching documents.
///
/// Filters are opaque to this crate: an unordered mapping from field-path
/// strings to match criteria, forwarded verbatim to the underlying store.
pub type Filter = Document;

/// A lazy cursor over raw result documents.
///
/// Produced by [`StoreBackend::aggregate`]; iteration and decoding are the
/// caller's responsibility.
pub type DocumentStream = BoxStream<'static, StoreResult<Document>>;

/// Abstract interface to one document store.
///
/// # Error tiers
///
/// Read operations (`find`, `find_one`, `count`, `aggregate`) report
/// failures as [`StoreError::Query`](crate::error::StoreError::Query);
/// write operations report [`StoreError::Write`](crate::error::StoreError::Write).
/// Zero-affected-rows handling is not a backend concern — the matched and
/// deleted counts are returned for the repository to judge.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Finds all documents matching `filter`, honoring skip/limit/sort.
    ///
    /// Returns a possibly empty sequence, never an absence marker.
    async fn find(
        &self,
        filter: Filter,
        options: FindOptions,
        collection: &str,
    ) -> StoreResult<Vec<Document>>;

    /// Finds the first document matching `filter`.
    ///
    /// Absence is a normal outcome and is reported as `None`.
    async fn find_one(&self, filter: Filter, collection: &str) -> StoreResult<Option<Document>>;

    /// Counts documents matching `filter`, honoring the count options.
    async fn count(
        &self,
        filter: Filter,
        options: CountOptions,
        collection: &str,
    ) -> StoreResult<u64>;

    /// Inserts a single document, bypassing document-schema validation
    /// where the store supports it.
    async fn insert_one(&self, document: Document, collection: &str) -> StoreResult<()>;

    /// Inserts a batch of documents in one bulk operation, each element as
    /// its own document.
    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> StoreResult<()>;

    /// Replaces the first document matching `filter` with `document`,
    /// inserting it when `upsert` is set and nothing matches.
    ///
    /// Returns the matched count.
    async fn replace_one(
        &self,
        filter: Filter,
        document: Document,
        upsert: bool,
        collection: &str,
    ) -> StoreResult<u64>;

    /// Merges `fields` into the first document matching `filter`
    /// ("set" semantics, not full replace).
    ///
    /// Returns the matched count.
    async fn update_one(
        &self,
        filter: Filter,
        fields: Document,
        collection: &str,
    ) -> StoreResult<u64>;

    /// Deletes the first document matching `filter`.
    ///
    /// Returns the deleted count.
    async fn delete_one(&self, filter: Filter, collection: &str) -> StoreResult<u64>;

    /// Deletes all documents matching `filter`.
    ///
    /// Returns the deleted count.
    async fn delete_many(&self, filter: Filter, collection: &str) -> StoreResult<u64>;

    /// Runs an aggregation pipeline, forwarded verbatim, and returns a lazy
    /// cursor over the raw result documents.
    async fn aggregate(
        &self,
        pipeline: Vec<Document>,
        collection: &str,
    ) -> StoreResult<DocumentStream>;
}

/// Factory trait for constructing backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
