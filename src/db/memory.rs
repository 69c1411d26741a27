//! In-process document store
//!
//! Evaluates the filter subset the repositories issue (equality on plain or
//! dotted paths, `$eq`, `$ne`, `$in`, `$nin`, `$exists`, `$or`, `$and`) with
//! MongoDB semantics: equality against an array field matches when any
//! element is equal. Each primitive runs under one lock acquisition, so it is
//! atomic for the document it touches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, DateTime, Document};
use tokio::sync::RwLock;
use tracing::debug;

use super::store::DocumentStore;
use crate::types::{Result, SolError};

/// Document store held entirely in memory
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of documents stored in `collection`
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SolError::StoreUnavailable("memory store offline".into()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)))
            .cloned())
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Document> {
        self.check_available()?;
        if !matches!(document.get("_id"), Some(Bson::ObjectId(_))) {
            document.insert("_id", ObjectId::new());
        }
        let now = Bson::DateTime(DateTime::now());
        set_path(&mut document, "metadata.createdAt", now.clone());
        set_path(&mut document, "metadata.updatedAt", now);

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        debug!(collection, "inserted document");
        Ok(document)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<Option<Document>> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
        else {
            return Ok(None);
        };

        for (path, value) in set {
            set_path(doc, &path, value);
        }
        Ok(Some(doc.clone()))
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .position(|d| matches(d, &filter))
            .map(|idx| docs.remove(idx)))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Whether `doc` satisfies `filter`
pub(crate) fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, cond)| match key.as_str() {
        "$or" => sub_filters(cond).any(|f| matches(doc, f)),
        "$and" => sub_filters(cond).all(|f| matches(doc, f)),
        field => field_matches(lookup(doc, field), cond),
    })
}

fn sub_filters(cond: &Bson) -> impl Iterator<Item = &Document> {
    cond.as_array()
        .into_iter()
        .flatten()
        .filter_map(Bson::as_document)
}

fn field_matches(value: Option<&Bson>, cond: &Bson) -> bool {
    match cond {
        Bson::Document(ops) if is_operator_doc(ops) => {
            ops.iter().all(|(op, arg)| apply_operator(value, op, arg))
        }
        _ => equals(value, cond),
    }
}

fn is_operator_doc(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn apply_operator(value: Option<&Bson>, op: &str, arg: &Bson) -> bool {
    match op {
        "$eq" => equals(value, arg),
        "$ne" => !equals(value, arg),
        "$in" => arg
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|c| equals(value, c))),
        "$nin" => arg
            .as_array()
            .is_some_and(|candidates| !candidates.iter().any(|c| equals(value, c))),
        "$exists" => value.is_some() == arg.as_bool().unwrap_or(true),
        _ => false,
    }
}

fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match (value, expected) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(items)), e) if !matches!(e, Bson::Array(_)) => {
            items.iter().any(|item| item == e)
        }
        (Some(v), e) => v == e,
    }
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_document()?.get(part)?;
    }
    Some(current)
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = doc.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_equality_and_array_membership() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let d = doc! { "manager": a, "costItems": [a, b], "meta": { "tag": "x" } };

        assert!(matches(&d, &doc! { "manager": a }));
        assert!(!matches(&d, &doc! { "manager": b }));
        assert!(matches(&d, &doc! { "costItems": b }));
        assert!(matches(&d, &doc! { "meta.tag": "x" }));
        assert!(matches(&d, &doc! { "missing": Bson::Null }));
    }

    #[test]
    fn test_set_operators() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let d = doc! { "_id": a };

        assert!(matches(&d, &doc! { "_id": { "$in": [a, b] } }));
        assert!(!matches(&d, &doc! { "_id": { "$in": [] } }));
        assert!(!matches(&d, &doc! { "_id": { "$nin": [a] } }));
        assert!(matches(&d, &doc! { "_id": { "$nin": [] } }));
        assert!(matches(&d, &doc! { "_id": { "$ne": b } }));
        assert!(matches(&d, &doc! { "reviewer": { "$exists": false } }));
    }

    #[test]
    fn test_or() {
        let m = ObjectId::new();
        let r = ObjectId::new();
        let d = doc! { "manager": m, "reviewer": r };

        assert!(matches(&d, &doc! { "$or": [{ "manager": r }, { "reviewer": r }] }));
        assert!(!matches(&d, &doc! { "$or": [{ "manager": r }, { "reviewer": m }] }));
        assert!(!matches(&d, &doc! { "$or": [] }));
    }

    #[tokio::test]
    async fn test_update_returns_post_update_document() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_one("things", doc! { "name": "a", "n": 1 })
            .await
            .unwrap();
        let id = inserted.get_object_id("_id").unwrap();
        assert!(inserted.get_document("metadata").unwrap().contains_key("createdAt"));

        let updated = store
            .update_one("things", doc! { "_id": id }, doc! { "n": 2, "metadata.updatedAt": "later" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.get_i32("n").unwrap(), 2);
        assert_eq!(updated.get_str("name").unwrap(), "a");
        let metadata = updated.get_document("metadata").unwrap();
        assert_eq!(metadata.get_str("updatedAt").unwrap(), "later");
        assert!(metadata.contains_key("createdAt"));

        let missing = store
            .update_one("things", doc! { "_id": ObjectId::new() }, doc! { "n": 3 })
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_one_removes_first_match() {
        let store = MemoryStore::new();
        store.insert_one("things", doc! { "k": 1 }).await.unwrap();
        store.insert_one("things", doc! { "k": 1 }).await.unwrap();

        assert!(store.delete_one("things", doc! { "k": 1 }).await.unwrap().is_some());
        assert_eq!(store.count("things").await, 1);
        assert!(store.delete_one("things", doc! { "k": 2 }).await.unwrap().is_none());
        assert!(store.delete_one("nothing", doc! {}).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_available(false);

        let err = store.find_many("things", doc! {}).await.unwrap_err();
        assert!(matches!(err, SolError::StoreUnavailable(_)));
        assert!(store.insert_one("things", doc! {}).await.is_err());

        store.set_available(true);
        assert!(store.find_many("things", doc! {}).await.unwrap().is_empty());
    }
}
