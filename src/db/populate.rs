//! Reference hydration
//!
//! A [`Populate`] names a reference field, the collection it points into and
//! the paths to hydrate inside the referenced documents. Trees of them are
//! plain `const` data, so a query carries its hydration depth as a value.
//!
//! Each level issues one `_id IN (...)` lookup for all documents at that level.
//! A single reference whose target is gone becomes `null`; missing members of
//! a reference array are dropped.

use std::collections::{HashMap, HashSet};

use bson::{doc, oid::ObjectId, Bson, Document};
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use super::store::DocumentStore;
use crate::types::Result;

/// One hydration path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Populate {
    /// Reference field on the parent document
    pub path: &'static str,
    /// Collection the reference resolves into
    pub from: &'static str,
    /// Paths to hydrate on the resolved documents
    pub nested: &'static [Populate],
}

impl Populate {
    /// A single-level path with nothing nested
    pub const fn leaf(path: &'static str, from: &'static str) -> Self {
        Self {
            path,
            from,
            nested: &[],
        }
    }

    /// Number of levels this path reaches, counting itself
    pub fn depth(&self) -> usize {
        1 + self.nested.iter().map(Populate::depth).max().unwrap_or(0)
    }
}

/// Hydrate `paths` on every document in `docs`, in place
pub fn populate<'a>(
    store: &'a dyn DocumentStore,
    docs: &'a mut [Document],
    paths: &'static [Populate],
) -> BoxFuture<'a, Result<()>> {
    async move {
        if docs.is_empty() {
            return Ok(());
        }
        for spec in paths {
            populate_path(store, docs, spec).await?;
        }
        Ok(())
    }
    .boxed()
}

async fn populate_path(
    store: &dyn DocumentStore,
    docs: &mut [Document],
    spec: &'static Populate,
) -> Result<()> {
    let ids = collect_ids(docs, spec.path);
    if ids.is_empty() {
        return Ok(());
    }

    debug!(path = spec.path, from = spec.from, refs = ids.len(), "populating");
    let mut related = store
        .find_many(spec.from, doc! { "_id": { "$in": ids } })
        .await?;

    if !spec.nested.is_empty() {
        populate(store, &mut related, spec.nested).await?;
    }

    let by_id: HashMap<ObjectId, Document> = related
        .into_iter()
        .filter_map(|d| d.get_object_id("_id").ok().map(|id| (id, d)))
        .collect();

    for doc in docs.iter_mut() {
        embed(doc, spec.path, &by_id);
    }
    Ok(())
}

/// Distinct reference ids held at `path`, in first-seen order
fn collect_ids(docs: &[Document], path: &str) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut push = |id: &ObjectId| {
        if seen.insert(*id) {
            ids.push(*id);
        }
    };

    for doc in docs {
        match doc.get(path) {
            Some(Bson::ObjectId(id)) => push(id),
            Some(Bson::Array(items)) => {
                for item in items {
                    if let Bson::ObjectId(id) = item {
                        push(id);
                    }
                }
            }
            _ => {}
        }
    }
    ids
}

fn embed(doc: &mut Document, path: &str, by_id: &HashMap<ObjectId, Document>) {
    let resolved = match doc.get(path) {
        Some(Bson::ObjectId(id)) => by_id
            .get(id)
            .cloned()
            .map(Bson::Document)
            .unwrap_or(Bson::Null),
        Some(Bson::Array(items)) => Bson::Array(
            items
                .iter()
                .filter_map(|item| match item {
                    Bson::ObjectId(id) => by_id.get(id).cloned().map(Bson::Document),
                    other => Some(other.clone()),
                })
                .collect(),
        ),
        _ => return,
    };
    doc.insert(path, resolved);
}
