use async_trait::async_trait;
use bson::{Document, doc};
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    Client, Collection as MongoCollection,
    options::{
        ClientOptions, CountOptions as MongoCountOptions, Credential,
        FindOptions as MongoFindOptions,
    },
};
use stirrup_core::{
    backend::{DocumentStream, Filter, StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    options::{CountOptions, FindOptions, SortDirection},
};

/// MongoDB-backed document store.
///
/// Filters, field merges and aggregation pipelines are forwarded to the
/// driver verbatim; the server is the source of truth for their semantics.
#[derive(Debug)]
pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(uri: &str, database: &str) -> MongoStoreBuilder {
        MongoStoreBuilder::new(uri, database)
    }

    fn collection(&self, name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(name)
    }

    fn find_options(options: FindOptions) -> MongoFindOptions {
        let mut native = MongoFindOptions::default();
        native.skip = options.skip;
        native.limit = options.limit;

        if let Some(sort) = &options.sort {
            native.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            });
        }

        native
    }

    fn count_options(options: CountOptions) -> MongoCountOptions {
        let mut native = MongoCountOptions::default();
        native.skip = options.skip;
        native.limit = options.limit;

        native
    }
}

#[async_trait]
impl StoreBackend for MongoStore {
    async fn find(
        &self,
        filter: Filter,
        options: FindOptions,
        collection: &str,
    ) -> StoreResult<Vec<Document>> {
        self.collection(collection)
            .find(filter)
            .with_options(Self::find_options(options))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn find_one(&self, filter: Filter, collection: &str) -> StoreResult<Option<Document>> {
        self.collection(collection)
            .find_one(filter)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn count(
        &self,
        filter: Filter,
        options: CountOptions,
        collection: &str,
    ) -> StoreResult<u64> {
        self.collection(collection)
            .count_documents(filter)
            .with_options(Self::count_options(options))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn insert_one(&self, document: Document, collection: &str) -> StoreResult<()> {
        self.collection(collection)
            .insert_one(document)
            .bypass_document_validation(true)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }

    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> StoreResult<()> {
        self.collection(collection)
            .insert_many(documents)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }

    async fn replace_one(
        &self,
        filter: Filter,
        document: Document,
        upsert: bool,
        collection: &str,
    ) -> StoreResult<u64> {
        Ok(self
            .collection(collection)
            .replace_one(filter, document)
            .upsert(upsert)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?
            .matched_count)
    }

    async fn update_one(
        &self,
        filter: Filter,
        fields: Document,
        collection: &str,
    ) -> StoreResult<u64> {
        Ok(self
            .collection(collection)
            .update_one(filter, doc! { "$set": fields })
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?
            .matched_count)
    }

    async fn delete_one(&self, filter: Filter, collection: &str) -> StoreResult<u64> {
        Ok(self
            .collection(collection)
            .delete_one(filter)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?
            .deleted_count)
    }

    async fn delete_many(&self, filter: Filter, collection: &str) -> StoreResult<u64> {
        Ok(self
            .collection(collection)
            .delete_many(filter)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?
            .deleted_count)
    }

    async fn aggregate(
        &self,
        pipeline: Vec<Document>,
        collection: &str,
    ) -> StoreResult<DocumentStream> {
        Ok(self
            .collection(collection)
            .aggregate(pipeline)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
            .map(|item| item.map_err(|e| StoreError::Query(e.to_string())))
            .boxed())
    }
}

/// A deferred adjustment to the parsed [`ClientOptions`], applied before
/// the client is built.
pub type ClientOptionsMutator = Box<dyn FnOnce(&mut ClientOptions) + Send>;

/// Builder assembling a [`MongoStore`] from a host URI, an optional
/// credential pair and any number of client-option mutators.
pub struct MongoStoreBuilder {
    uri: String,
    database: String,
    credential: Option<(String, String)>,
    mutators: Vec<ClientOptionsMutator>,
}

impl MongoStoreBuilder {
    pub fn new(uri: &str, database: &str) -> Self {
        Self {
            uri: uri.to_string(),
            database: database.to_string(),
            credential: None,
            mutators: Vec::new(),
        }
    }

    /// Authenticates with a username/password credential pair.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credential = Some((username.into(), password.into()));
        self
    }

    /// Queues a mutator over the parsed client options.
    ///
    /// Mutators run in registration order, before the credential pair is
    /// applied.
    pub fn with_client_option(
        mut self,
        mutator: impl FnOnce(&mut ClientOptions) + Send + 'static,
    ) -> Self {
        self.mutators.push(Box::new(mutator));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoStoreBuilder {
    type Backend = MongoStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        for mutator in self.mutators {
            mutator(&mut options);
        }

        if let Some((username, password)) = self.credential {
            let mut credential = Credential::default();
            credential.username = Some(username);
            credential.password = Some(password);
            options.credential = Some(credential);
        }

        Ok(MongoStore::new(
            Client::with_options(options)
                .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
