//! TFA binding store
//!
//! One credential record per user. The store does not enforce uniqueness:
//! callers check [`TfaStore::get_by_user_id`] before [`TfaStore::save`].

use std::sync::Arc;

use bson::{doc, oid::ObjectId, Document};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::schemas::{Metadata, TfaDoc, TFA_COLLECTION};
use crate::db::DocumentStore;
use crate::types::{parse_id, Result, SolError};

/// Payload for binding a second factor to a user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTfa {
    pub user: ObjectId,
    pub secret: String,
    pub recovery_codes: Vec<String>,
}

impl From<NewTfa> for TfaDoc {
    fn from(new: NewTfa) -> Self {
        Self {
            id: None,
            metadata: Metadata::default(),
            user: new.user,
            secret: new.secret,
            recovery_codes: new.recovery_codes,
        }
    }
}

/// Binding view without credential material, for operator output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TfaSummary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub metadata: Metadata,
    pub recovery_codes_left: usize,
}

impl From<&TfaDoc> for TfaSummary {
    fn from(tfa: &TfaDoc) -> Self {
        Self {
            id: tfa.id,
            user: tfa.user,
            metadata: tfa.metadata.clone(),
            recovery_codes_left: tfa.recovery_codes.len(),
        }
    }
}

/// Access to TFA bindings
#[derive(Clone)]
pub struct TfaStore {
    store: Arc<dyn DocumentStore>,
}

impl TfaStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Insert a binding unconditionally
    pub async fn save(&self, new: NewTfa) -> Result<TfaDoc> {
        let document = bson::to_document(&TfaDoc::from(new))?;
        let stored = decode(self.store.insert_one(TFA_COLLECTION, document).await?)?;
        info!(user = %stored.user, "saved tfa binding");
        Ok(stored)
    }

    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<TfaDoc>> {
        let user = parse_id(user_id)?;
        debug!(user_id, "tfa lookup");
        self.store
            .find_one(TFA_COLLECTION, doc! { "user": user })
            .await?
            .map(decode)
            .transpose()
    }

    /// Remove the user's binding in one conditional delete.
    ///
    /// Fails with `NotFound` when the user has no binding.
    pub async fn delete(&self, user_id: &str) -> Result<TfaDoc> {
        let user = parse_id(user_id)?;
        match self
            .store
            .delete_one(TFA_COLLECTION, doc! { "user": user })
            .await?
        {
            Some(removed) => {
                info!(user_id, "deleted tfa binding");
                decode(removed)
            }
            None => {
                warn!(user_id, "no tfa binding to delete");
                Err(SolError::not_found("TFA binding", user_id))
            }
        }
    }
}

fn decode(doc: Document) -> Result<TfaDoc> {
    Ok(bson::from_document(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn tfa_store() -> (Arc<MemoryStore>, TfaStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), TfaStore::new(store))
    }

    #[tokio::test]
    async fn test_save_and_get_by_user() {
        let (_, tfa) = tfa_store();
        let user = ObjectId::new();

        let saved = tfa
            .save(NewTfa {
                user,
                secret: "JBSWY3DPEHPK3PXP".into(),
                recovery_codes: vec!["a1b2".into()],
            })
            .await
            .unwrap();
        assert!(saved.id.is_some());

        let found = tfa.get_by_user_id(&user.to_hex()).await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert_eq!(found.secret, "JBSWY3DPEHPK3PXP");
        assert_eq!(found.recovery_codes, ["a1b2"]);

        assert!(tfa
            .get_by_user_id(&ObjectId::new().to_hex())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_summary_omits_credentials() {
        let (_, tfa) = tfa_store();
        let saved = tfa
            .save(NewTfa {
                user: ObjectId::new(),
                secret: "JBSWY3DPEHPK3PXP".into(),
                recovery_codes: vec!["a1b2".into(), "c3d4".into()],
            })
            .await
            .unwrap();

        let summary = TfaSummary::from(&saved);
        assert_eq!(summary.user, saved.user);
        assert_eq!(summary.recovery_codes_left, 2);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("JBSWY3DPEHPK3PXP"));
        assert!(!json.contains("a1b2"));
        assert!(!json.contains("secret"));
    }

    #[tokio::test]
    async fn test_delete_without_binding_is_not_found() {
        let (_, tfa) = tfa_store();
        let err = tfa.delete(&ObjectId::new().to_hex()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_only_that_users_binding() {
        let (store, tfa) = tfa_store();
        let alice = ObjectId::new();
        let bob = ObjectId::new();
        for user in [alice, bob] {
            tfa.save(NewTfa {
                user,
                secret: "s".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let removed = tfa.delete(&alice.to_hex()).await.unwrap();
        assert_eq!(removed.user, alice);
        assert_eq!(store.count(TFA_COLLECTION).await, 1);
        assert!(tfa.get_by_user_id(&bob.to_hex()).await.unwrap().is_some());
        assert!(tfa.delete(&alice.to_hex()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_bindings_are_not_prevented() {
        let (store, tfa) = tfa_store();
        let user = ObjectId::new();
        for _ in 0..2 {
            tfa.save(NewTfa {
                user,
                secret: "s".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        }
        assert_eq!(store.count(TFA_COLLECTION).await, 2);
    }
}
