//! TFA binding document schema
//!
//! Binds one user to their second-factor credential.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{Identified, Metadata};

/// Collection name for TFA bindings
pub const TFA_COLLECTION: &str = "tfas";

/// TFA binding stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TfaDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// User the credential belongs to
    pub user: ObjectId,

    /// Shared secret for the one-time-password generator
    pub secret: String,

    /// Single-use recovery codes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovery_codes: Vec<String>,
}

impl Identified for TfaDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl IntoIndexes for TfaDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Lookup by user; not unique, one-per-user is kept by callers
            (
                doc! { "user": 1 },
                Some(
                    IndexOptions::builder()
                        .name("user_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
