//! Agreement repository
//!
//! Single point of read/write access to agreements. Reads are built from
//! [`AgreementQuery`] values; writes are single atomic `$set` operations
//! executed by the store, which also returns the post-update document.

use std::sync::Arc;

use bson::{doc, oid::ObjectId, DateTime, Document};
use tracing::{debug, info, warn};

use super::payload::{AgreementPatch, NewAgreement, ReferenceTarget};
use super::query::AgreementQuery;
use crate::db::schemas::{
    ActiveStatus, AgreementDoc, AGREEMENT_COLLECTION, UPDATED_AT_PATH, USER_COLLECTION,
};
use crate::db::{populate, DocumentStore};
use crate::types::{parse_id, parse_ids, Result, SolError};

const ENTITY: &str = "Agreement";

/// Agreement access layer
#[derive(Clone)]
pub struct AgreementRepository {
    store: Arc<dyn DocumentStore>,
    check_references: bool,
}

impl AgreementRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            check_references: false,
        }
    }

    /// Reject writes whose reference ids do not exist in their collections.
    ///
    /// Off by default: dangling references are persisted as given.
    pub fn with_reference_checks(mut self, enabled: bool) -> Self {
        self.check_references = enabled;
        self
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Detail view: workPlan, association, manager and project hydrated.
    /// Inactive agreements are still returned.
    pub async fn find_by_id(&self, id: &str) -> Result<AgreementDoc> {
        let oid = parse_id(id)?;
        self.fetch_one(AgreementQuery::by_id(oid))
            .await?
            .ok_or_else(|| SolError::not_found(ENTITY, id))
    }

    /// Everything a user manages or reviews, any status, unhydrated
    pub async fn find_agreement_by_reviewer_or_manager_id(
        &self,
        user_id: &str,
    ) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::by_reviewer_or_manager(parse_id(user_id)?))
            .await
    }

    pub async fn find_agreement_by_reviewer_id(&self, user_id: &str) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::by_reviewer(parse_id(user_id)?))
            .await
    }

    /// Any status, with the work plan hydrated one level
    pub async fn find_agreement_by_manager_id(&self, user_id: &str) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::by_manager(parse_id(user_id)?))
            .await
    }

    /// First agreement of a project, if any
    pub async fn find_agreement_by_project_id(
        &self,
        project_id: &str,
    ) -> Result<Option<AgreementDoc>> {
        self.fetch_one(AgreementQuery::first_for_project(parse_id(project_id)?))
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::all_active()).await
    }

    /// Agreements not listed in `ids`, regardless of status
    pub async fn find_agreements_without_project<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::excluding(parse_ids(ids)?)).await
    }

    /// Active agreements listed in `ids`
    pub async fn find_agreements_with_project<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::including(parse_ids(ids)?)).await
    }

    pub async fn find_for_association(&self, association_id: &str) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::for_association(parse_id(association_id)?))
            .await
    }

    /// Active agreements managed by a general project manager
    pub async fn find_for_general_manager(&self, manager_id: &str) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::for_general_manager(parse_id(manager_id)?))
            .await
    }

    pub async fn find_by_project_id(&self, project_id: &str) -> Result<Vec<AgreementDoc>> {
        self.fetch(AgreementQuery::for_project(parse_id(project_id)?))
            .await
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Insert a new, active agreement. The result is not hydrated.
    pub async fn register(&self, new: NewAgreement) -> Result<AgreementDoc> {
        self.verify_references(&new.references()).await?;

        let document = bson::to_document(&AgreementDoc::from(new))?;
        let stored = self.store.insert_one(AGREEMENT_COLLECTION, document).await?;
        let agreement = decode(stored)?;

        info!(id = ?agreement.id, "registered agreement");
        Ok(agreement)
    }

    /// Soft delete: the document stays, with `activeStatus = inactive`
    pub async fn delete_by_id(&self, id: &str) -> Result<AgreementDoc> {
        let set = doc! { "activeStatus": ActiveStatus::Inactive };
        let agreement = self.apply(id, set).await?;
        info!(id, "deactivated agreement");
        Ok(agreement)
    }

    /// Replace only the manager reference
    pub async fn add_manager(&self, id: &str, manager_id: &str) -> Result<AgreementDoc> {
        let manager = parse_id(manager_id)?;
        self.verify_references(&[ReferenceTarget {
            field: "manager",
            collection: USER_COLLECTION,
            id: manager,
        }])
        .await?;

        let agreement = self.apply(id, doc! { "manager": manager }).await?;
        info!(id, manager = manager_id, "assigned agreement manager");
        Ok(agreement)
    }

    /// Merge the supplied fields into the agreement
    pub async fn update(&self, id: &str, patch: AgreementPatch) -> Result<AgreementDoc> {
        self.verify_references(&patch.references()).await?;

        let set = patch.to_set()?;
        let fields: Vec<String> = set.keys().cloned().collect();
        let agreement = self.apply(id, set).await?;
        info!(id, ?fields, "updated agreement");
        Ok(agreement)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn fetch(&self, query: AgreementQuery) -> Result<Vec<AgreementDoc>> {
        if query.matches_nothing() {
            return Ok(Vec::new());
        }

        let filter = query.filter();
        debug!(
            ?filter,
            scope = ?query.scope(),
            backend = self.store.backend(),
            "agreement query"
        );
        let mut docs = self.store.find_many(AGREEMENT_COLLECTION, filter).await?;
        populate(self.store.as_ref(), &mut docs, query.hydration()).await?;

        docs.into_iter().map(decode).collect()
    }

    async fn fetch_one(&self, query: AgreementQuery) -> Result<Option<AgreementDoc>> {
        let filter = query.filter();
        debug!(
            ?filter,
            scope = ?query.scope(),
            backend = self.store.backend(),
            "agreement lookup"
        );
        let Some(doc) = self.store.find_one(AGREEMENT_COLLECTION, filter).await? else {
            return Ok(None);
        };

        let mut docs = vec![doc];
        populate(self.store.as_ref(), &mut docs, query.hydration()).await?;
        docs.pop().map(decode).transpose()
    }

    /// One atomic `$set` on the agreement `id`, returning the updated document
    async fn apply(&self, id: &str, mut set: Document) -> Result<AgreementDoc> {
        let oid = parse_id(id)?;
        set.insert(UPDATED_AT_PATH, DateTime::now());

        match self
            .store
            .update_one(AGREEMENT_COLLECTION, doc! { "_id": oid }, set)
            .await?
        {
            Some(updated) => decode(updated),
            None => {
                warn!(id, "agreement not found for update");
                Err(SolError::not_found(ENTITY, id))
            }
        }
    }

    async fn verify_references(&self, targets: &[ReferenceTarget]) -> Result<()> {
        if !self.check_references {
            return Ok(());
        }

        for target in targets {
            if !self.exists(target.collection, target.id).await? {
                warn!(field = target.field, id = %target.id, "dangling reference rejected");
                return Err(SolError::InvalidReference {
                    field: target.field,
                    id: target.id.to_hex(),
                });
            }
        }
        Ok(())
    }

    async fn exists(&self, collection: &str, id: ObjectId) -> Result<bool> {
        Ok(self
            .store
            .find_one(collection, doc! { "_id": id })
            .await?
            .is_some())
    }
}

fn decode(doc: Document) -> Result<AgreementDoc> {
    Ok(bson::from_document(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{Ref, UserDoc};
    use crate::db::MemoryStore;

    fn repo() -> (Arc<MemoryStore>, AgreementRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = AgreementRepository::new(store.clone());
        (store, repo)
    }

    async fn user(store: &MemoryStore, name: &str) -> ObjectId {
        let doc = bson::to_document(&UserDoc {
            name: name.into(),
            email: format!("{}@example.org", name),
            ..Default::default()
        })
        .unwrap();
        store
            .insert_one(USER_COLLECTION, doc)
            .await
            .unwrap()
            .get_object_id("_id")
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_returns_unhydrated_active_agreement() {
        let (store, repo) = repo();
        let manager = user(&store, "ana").await;

        let agreement = repo
            .register(NewAgreement {
                register_number: "2024/7".into(),
                manager: Some(manager),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(agreement.id.is_some());
        assert!(agreement.is_active());
        assert_eq!(agreement.manager, Some(Ref::Id(manager)));
        assert!(agreement.metadata.created_at.is_some());
    }

    #[tokio::test]
    async fn test_find_by_id_hydrates_manager() {
        let (store, repo) = repo();
        let manager = user(&store, "ana").await;
        let created = repo
            .register(NewAgreement {
                manager: Some(manager),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = repo
            .find_by_id(&created.id.unwrap().to_hex())
            .await
            .unwrap();
        let hydrated = found.manager.as_ref().and_then(Ref::populated).unwrap();
        assert_eq!(hydrated.name, "ana");
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let (_, repo) = repo();
        let missing = ObjectId::new().to_hex();

        assert!(repo.find_by_id(&missing).await.unwrap_err().is_not_found());
        assert!(repo.delete_by_id(&missing).await.unwrap_err().is_not_found());
        assert!(repo
            .add_manager(&missing, &ObjectId::new().to_hex())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(repo
            .update(&missing, AgreementPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let (_, repo) = repo();
        let err = repo.find_by_id("nope").await.unwrap_err();
        assert!(matches!(err, SolError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_reference_checks() {
        let (store, repo) = repo();
        let repo = repo.with_reference_checks(true);
        let ghost = ObjectId::new();

        let err = repo
            .register(NewAgreement {
                reviewer: Some(ghost),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SolError::InvalidReference { field: "reviewer", .. }));
        assert_eq!(store.count(AGREEMENT_COLLECTION).await, 0);

        let real = user(&store, "rui").await;
        let created = repo
            .register(NewAgreement {
                reviewer: Some(real),
                ..Default::default()
            })
            .await
            .unwrap();
        let err = repo
            .add_manager(&created.id.unwrap().to_hex(), &ghost.to_hex())
            .await
            .unwrap_err();
        assert!(matches!(err, SolError::InvalidReference { field: "manager", .. }));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (store, repo) = repo();
        store.set_available(false);

        let err = repo.find_all().await.unwrap_err();
        assert!(matches!(err, SolError::StoreUnavailable(_)));
    }
}
