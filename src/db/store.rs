//! Document store adapter
//!
//! The data-access core only needs a handful of single-document primitives
//! from the storage engine. Hydration is layered on top in [`super::populate`].

use async_trait::async_trait;
use bson::Document;

use crate::types::Result;

/// Storage primitives over untyped documents.
///
/// Each call is one round trip and is atomic for the single document it
/// touches. Implementations do not retry.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find the first document matching `filter`
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Find every document matching `filter`, in insertion order
    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>>;

    /// Insert a document and return it as stored.
    ///
    /// Assigns `_id` when absent and stamps `metadata.createdAt` /
    /// `metadata.updatedAt`.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Document>;

    /// Apply `set` as one `$set` to the first document matching `filter`.
    ///
    /// Returns the document after the update, or `None` when nothing matched.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<Option<Document>>;

    /// Remove the first document matching `filter` and return it
    async fn delete_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Human-readable backend name for logs
    fn backend(&self) -> &'static str;
}
