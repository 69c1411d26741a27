//! MongoDB client and document store
//!
//! Pattern adapted from holo-host/rust/util_libs/db/src/mongodb

use async_trait::async_trait;
use bson::{doc, Bson, DateTime, Document};
use futures_util::TryStreamExt;
use mongodb::{
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use tracing::{debug, info};

use crate::db::schemas::{AgreementDoc, TfaDoc, AGREEMENT_COLLECTION, TFA_COLLECTION};
use crate::db::store::DocumentStore;
use crate::types::{Result, SolError};

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB-backed document store
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db_name: String,
}

impl MongoStore {
    /// Connect to MongoDB and verify the connection
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri).await.map_err(|e| {
            SolError::StoreUnavailable(format!("Failed to connect to MongoDB: {}", e))
        })?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Connect and create the indexes the repositories rely on
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let store = Self::new(uri, db_name).await?;
        store.apply_indexes::<AgreementDoc>(AGREEMENT_COLLECTION).await?;
        store.apply_indexes::<TfaDoc>(TFA_COLLECTION).await?;
        Ok(store)
    }

    /// Apply schema-defined indexes to a collection
    pub async fn apply_indexes<T: IntoIndexes>(&self, collection: &str) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.collection(collection)
            .create_indexes(indices)
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("Failed to create indexes: {}", e)))?;

        debug!(collection, "indexes applied");
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.db_name).collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one(filter)
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("Find failed: {}", e)))
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(filter)
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("Find failed: {}", e)))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("Cursor read failed: {}", e)))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Document> {
        let now = DateTime::now();
        let mut metadata = document.get_document("metadata").cloned().unwrap_or_default();
        metadata.insert("createdAt", now);
        metadata.insert("updatedAt", now);
        document.insert("metadata", metadata);

        let result = self
            .collection(collection)
            .insert_one(&document)
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("Insert failed: {}", e)))?;

        match result.inserted_id {
            Bson::ObjectId(id) => {
                document.insert("_id", id);
                Ok(document)
            }
            _ => Err(SolError::StoreUnavailable("Failed to get inserted ID".into())),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one_and_update(filter, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("Update failed: {}", e)))
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one_and_delete(filter)
            .await
            .map_err(|e| SolError::StoreUnavailable(format!("Delete failed: {}", e)))
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

