use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document};
use mongodb::{
    Client, Collection as MongoCollection,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, ReturnDocument as MongoReturnDocument},
};
use tracing::debug;

use docrepo_core::{
    database::{DatabaseBuilder, DocumentDatabase},
    error::{DocumentStoreError, DocumentStoreResult},
    filter::Filter,
    handle::{CollectionHandle, DeleteSummary, ReturnDocument, UpdateOptions},
    key::{DocumentKey, KEY_FIELD, document_key},
};

/// Environment variable holding the MongoDB connection string.
pub const URI_VAR: &str = "MONGODB_URI";
/// Environment variable holding the database name.
pub const DATABASE_VAR: &str = "MONGODB_DATABASE";

const DUPLICATE_KEY: i32 = 11000;


#[derive(Debug, Clone)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    /// Name of the database the store works in.
    pub fn database_name(&self) -> &str {
        &self.database
    }
}

#[async_trait]
impl DocumentDatabase for MongoDbStore {
    type Handle = MongoDbCollection;

    fn collection(&self, name: &str) -> Self::Handle {
        MongoDbCollection {
            name: name.to_string(),
            inner: self.client
                .database(&self.database)
                .collection(name),
        }
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        let mut names = self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(backend)?;
        names.sort();

        Ok(names)
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.client
            .database(&self.database)
            .collection::<Document>(name)
            .drop()
            .await
            .map_err(backend)?;

        Ok(())
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}


/// Handle to one MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoDbCollection {
    name: String,
    inner: MongoCollection<Document>,
}

fn backend(err: MongoError) -> DocumentStoreError {
    DocumentStoreError::Backend(err.to_string())
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(failure)) if failure.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl CollectionHandle for MongoDbCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, filter: Filter) -> DocumentStoreResult<Vec<Document>> {
        self.inner
            .find(filter.into_document())
            .await
            .map_err(backend)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend)
    }

    async fn find_one(&self, filter: Filter) -> DocumentStoreResult<Option<Document>> {
        self.inner
            .find_one(filter.into_document())
            .await
            .map_err(backend)
    }

    async fn find_by_id(&self, key: DocumentKey) -> DocumentStoreResult<Option<Document>> {
        self.inner
            .find_one(Filter::by_key(key).into_document())
            .await
            .map_err(backend)
    }

    async fn create(&self, mut document: Document) -> DocumentStoreResult<Document> {
        if document_key(&document).is_none() {
            let mut keyed = Document::new();
            keyed.insert(KEY_FIELD, DocumentKey::new());
            keyed.extend(document.into_iter().filter(|(field, _)| field != KEY_FIELD));
            document = keyed;
        }

        let result = self.inner
            .insert_one(&document)
            .await;

        match result {
            Ok(inserted) => {
                debug!(collection = %self.name, key = %inserted.inserted_id, "inserted document");
                document.insert(KEY_FIELD, inserted.inserted_id);

                Ok(document)
            },
            Err(err) if is_duplicate_key(&err) => Err(DocumentStoreError::DocumentAlreadyExists(
                document_key(&document)
                    .map(Bson::to_string)
                    .unwrap_or_default(),
                self.name.clone(),
            )),
            Err(err) => Err(backend(err)),
        }
    }

    async fn find_by_id_and_remove(&self, key: DocumentKey) -> DocumentStoreResult<Option<Document>> {
        self.inner
            .find_one_and_delete(Filter::by_key(key).into_document())
            .await
            .map_err(backend)
    }

    async fn find_by_id_and_update(
        &self,
        key: DocumentKey,
        mut document: Document,
        options: UpdateOptions,
    ) -> DocumentStoreResult<Option<Document>> {
        // The stored key is immutable; a replacement may not carry a different one.
        document.remove(KEY_FIELD);

        self.inner
            .find_one_and_replace(Filter::by_key(key).into_document(), document)
            .return_document(match options.return_document {
                ReturnDocument::Before => MongoReturnDocument::Before,
                ReturnDocument::After => MongoReturnDocument::After,
            })
            .await
            .map_err(backend)
    }

    async fn delete_many(&self, filter: Filter) -> DocumentStoreResult<DeleteSummary> {
        let result = self.inner
            .delete_many(filter.into_document())
            .await
            .map_err(backend)?;

        Ok(DeleteSummary::acknowledged(result.deleted_count))
    }
}


/// Builder for [`MongoDbStore`].
#[derive(Debug, Clone)]
pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }

    /// Reads the connection string from `MONGODB_URI` and the database name from
    /// `MONGODB_DATABASE`.
    pub fn from_env() -> DocumentStoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DocumentStoreResult<Self> {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| DocumentStoreError::Initialization(format!("{name} is not set")))
        };

        Ok(Self {
            dsn: require(URI_VAR)?,
            database: require(DATABASE_VAR)?,
        })
    }
}

#[async_trait]
impl DatabaseBuilder for MongoDbStoreBuilder {
    type Database = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Database> {
        debug!(database = %self.database, "connecting to mongodb");

        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
