//! The generic repository: typed CRUD and query access to one collection.
//!
//! A [`Repository`] is created once per entity type at bootstrap time and
//! lives for the duration of the application. It is stateless between calls
//! apart from its collection binding, and owns nothing: the backend handle
//! it wraps belongs to the bootstrap shell.

use std::{marker::PhantomData, sync::Arc};
use tracing::debug;

use crate::{
    backend::{DocumentStream, Filter, StoreBackend},
    entity::{Entity, EntityExt},
    error::{ReadFailurePolicy, StoreError, StoreResult},
    options::{CountOptions, FindOptions},
    page::Page,
};

/// Per-repository behavior knobs, supplied explicitly at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoOptions {
    /// Emit a `tracing` debug record with the collection and filter for
    /// each operation. Replaces any ambient environment switch; the value
    /// comes from configuration, not from process state.
    pub trace_queries: bool,
    /// What to do when a read-path operation fails.
    pub read_failures: ReadFailurePolicy,
}

/// Type-parameterized CRUD and query access to one logical collection.
///
/// The collection binding is derived from the entity type's name at
/// construction and can be rebound with [`Repository::set_collection`].
///
/// # Error tiers
///
/// Read operations (`find_all`, `find_page`, `find_one`, `count`) treat
/// query and decode failures per the configured [`ReadFailurePolicy`]; with
/// the default `Abort` policy they panic at the point of failure. Write
/// operations always return recoverable error values, and zero affected
/// documents on `update`/`delete`/`delete_many` surfaces as
/// [`StoreError::NoMatch`], never as silent success.
///
/// # Concurrency
///
/// Operations add no synchronization of their own; the backend is assumed
/// safe for concurrent use. Rebinding the collection is not synchronized
/// against in-flight operations — do not share one instance across a rebind
/// under concurrent use.
#[derive(Debug)]
pub struct Repository<T: Entity> {
    backend: Arc<dyn StoreBackend>,
    collection: String,
    options: RepoOptions,
    _marker: PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    /// Creates a repository bound to the collection derived from `T`.
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self::with_options(backend, RepoOptions::default())
    }

    /// Creates a repository with explicit behavior options.
    pub fn with_options(backend: Arc<dyn StoreBackend>, options: RepoOptions) -> Self {
        Self {
            backend,
            collection: T::collection_name(),
            options,
            _marker: PhantomData,
        }
    }

    /// The name of the collection this repository is bound to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Rebinds this repository to an explicitly named collection.
    ///
    /// Unsynchronized: the collection targeted by operations racing this
    /// call is undefined.
    pub fn set_collection(&mut self, name: impl Into<String>) {
        self.collection = name.into();
    }

    /// Finds all entities matching `filter`.
    ///
    /// Always returns a (possibly empty) sequence. Query and decode
    /// failures are read-path failures.
    ///
    /// # Panics
    ///
    /// With [`ReadFailurePolicy::Abort`], panics on query or decode failure.
    pub async fn find_all(&self, filter: Filter, options: FindOptions) -> StoreResult<Vec<T>> {
        self.trace("find_all", &filter);

        let documents = self.escalate(
            self.backend
                .find(filter, options, &self.collection)
                .await,
        )?;

        self.escalate(
            documents
                .into_iter()
                .map(T::from_document)
                .collect::<StoreResult<Vec<T>>>(),
        )
    }

    /// Fetches one skip/limit page of entities matching `filter`.
    ///
    /// The total is computed by a separate count query and is authoritative
    /// even when the page itself is empty; the fetch query is only issued
    /// when the total is positive.
    ///
    /// # Panics
    ///
    /// With [`ReadFailurePolicy::Abort`], panics on query or decode failure.
    pub async fn find_page(
        &self,
        filter: Filter,
        skip: u64,
        take: i64,
        options: FindOptions,
    ) -> StoreResult<Page<T>> {
        self.trace("find_page", &filter);

        let total = self.escalate(
            self.backend
                .count(filter.clone(), CountOptions::default(), &self.collection)
                .await,
        )?;

        if total == 0 {
            return Ok(Page::empty(0));
        }

        let options = FindOptions { skip: Some(skip), limit: Some(take), ..options };
        let documents = self.escalate(
            self.backend
                .find(filter, options, &self.collection)
                .await,
        )?;
        let data = self.escalate(
            documents
                .into_iter()
                .map(T::from_document)
                .collect::<StoreResult<Vec<T>>>(),
        )?;

        Ok(Page::new(data, total))
    }

    /// Finds the first entity matching `filter`.
    ///
    /// Absence is a normal outcome, reported as `Ok(None)`.
    ///
    /// # Panics
    ///
    /// With [`ReadFailurePolicy::Abort`], panics on query or decode failure.
    pub async fn find_one(&self, filter: Filter) -> StoreResult<Option<T>> {
        self.trace("find_one", &filter);

        let document = self.escalate(
            self.backend
                .find_one(filter, &self.collection)
                .await,
        )?;

        match document {
            Some(document) => self.escalate(T::from_document(document)).map(Some),
            None => Ok(None),
        }
    }

    /// Inserts one entity, bypassing document-schema validation.
    ///
    /// Store-level errors propagate unchanged as recoverable values.
    pub async fn insert(&self, entity: &T) -> StoreResult<()> {
        self.backend
            .insert_one(entity.to_document()?, &self.collection)
            .await
    }

    /// Inserts a batch of entities in one bulk operation.
    ///
    /// Each entity becomes its own document in the bulk insert.
    pub async fn insert_many(&self, entities: &[T]) -> StoreResult<()> {
        let documents = entities
            .iter()
            .map(EntityExt::to_document)
            .collect::<StoreResult<Vec<_>>>()?;

        self.backend
            .insert_many(documents, &self.collection)
            .await
    }

    /// Replaces the first entity matching `filter` with `entity`.
    ///
    /// Falls back to [`Repository::insert`] when nothing matches; otherwise
    /// performs an upsert-enabled replace.
    pub async fn replace(&self, filter: Filter, entity: &T) -> StoreResult<()> {
        self.trace("replace", &filter);

        match self
            .backend
            .find_one(filter.clone(), &self.collection)
            .await?
        {
            None => self.insert(entity).await,
            Some(_) => {
                self.backend
                    .replace_one(filter, entity.to_document()?, true, &self.collection)
                    .await?;

                Ok(())
            }
        }
    }

    /// Merges `fields` into the first document matching `filter`
    /// ("set" semantics, not full replace).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoMatch`] when zero documents matched; the
    /// store is left unchanged in that case.
    pub async fn update(&self, filter: Filter, fields: Filter) -> StoreResult<()> {
        let matched = self
            .backend
            .update_one(filter, fields, &self.collection)
            .await?;

        if matched == 0 {
            return Err(StoreError::NoMatch(self.collection.clone()));
        }

        Ok(())
    }

    /// Deletes at most one document matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoMatch`] when zero documents were deleted.
    pub async fn delete(&self, filter: Filter) -> StoreResult<()> {
        let deleted = self
            .backend
            .delete_one(filter, &self.collection)
            .await?;

        if deleted == 0 {
            return Err(StoreError::NoMatch(self.collection.clone()));
        }

        Ok(())
    }

    /// Deletes all documents matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoMatch`] when zero documents were deleted.
    pub async fn delete_many(&self, filter: Filter) -> StoreResult<()> {
        let deleted = self
            .backend
            .delete_many(filter, &self.collection)
            .await?;

        if deleted == 0 {
            return Err(StoreError::NoMatch(self.collection.clone()));
        }

        Ok(())
    }

    /// Runs an aggregation pipeline, forwarded verbatim.
    ///
    /// Cursor iteration and decoding are the caller's responsibility.
    pub async fn aggregate(&self, pipeline: Vec<Filter>) -> StoreResult<DocumentStream> {
        self.backend
            .aggregate(pipeline, &self.collection)
            .await
    }

    /// Counts documents matching `filter`.
    ///
    /// # Panics
    ///
    /// With [`ReadFailurePolicy::Abort`], panics on query failure.
    pub async fn count(&self, filter: Filter, options: CountOptions) -> StoreResult<u64> {
        self.trace("count", &filter);

        self.escalate(
            self.backend
                .count(filter, options, &self.collection)
                .await,
        )
    }

    fn trace(&self, operation: &str, filter: &Filter) {
        if self.options.trace_queries {
            debug!(collection = %self.collection, ?filter, operation);
        }
    }

    fn escalate<V>(&self, result: StoreResult<V>) -> StoreResult<V> {
        match result {
            Err(err) if self.options.read_failures == ReadFailurePolicy::Abort => {
                panic!(
                    "unrecoverable read failure on collection {}: {err}",
                    self.collection
                )
            }
            other => other,
        }
    }
}
