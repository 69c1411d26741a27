//! Agreement document schema
//!
//! The central aggregate. Related entities are held as [`Ref`]s and only
//! embedded when a query asks for them.

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{
    AssociationDoc, Identified, Metadata, ProjectDoc, Ref, UserDoc, WorkPlanDoc,
};

/// Collection name for agreements
pub const AGREEMENT_COLLECTION: &str = "agreements";

/// Visibility status. Deleting an agreement only flips this to `Inactive`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActiveStatus {
    #[default]
    Active,
    Inactive,
}

impl ActiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveStatus::Active => "active",
            ActiveStatus::Inactive => "inactive",
        }
    }
}

impl From<ActiveStatus> for Bson {
    fn from(status: ActiveStatus) -> Self {
        Bson::String(status.as_str().to_string())
    }
}

/// Agreement document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgreementDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Common metadata (createdAt, updatedAt)
    #[serde(default)]
    pub metadata: Metadata,

    /// Agreement registration number
    #[serde(default)]
    pub register_number: String,

    /// What the agreement covers
    #[serde(default)]
    pub register_object: String,

    /// Total agreed amount
    #[serde(default)]
    pub value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_date: Option<DateTime>,

    /// End of the agreement's validity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_date: Option<DateTime>,

    /// Free-form business fields this core does not interpret
    #[serde(default, skip_serializing_if = "Document::is_empty")]
    pub details: Document,

    #[serde(default)]
    pub active_status: ActiveStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<Ref<AssociationDoc>>,

    /// Project manager responsible for the agreement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Ref<UserDoc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<Ref<UserDoc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Ref<ProjectDoc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_plan: Option<Ref<WorkPlanDoc>>,
}

impl AgreementDoc {
    pub fn is_active(&self) -> bool {
        self.active_status == ActiveStatus::Active
    }

    /// Id of the current manager, hydrated or not
    pub fn manager_id(&self) -> Option<ObjectId> {
        self.manager.as_ref().and_then(Ref::id)
    }
}

impl Identified for AgreementDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl IntoIndexes for AgreementDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let index = |field: &str| {
            (
                doc! { field: 1 },
                Some(
                    IndexOptions::builder()
                        .name(format!("{}_index", field))
                        .build(),
                ),
            )
        };

        vec![
            // Role-scoped listings
            index("manager"),
            index("reviewer"),
            index("association"),
            index("project"),
            index("activeStatus"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let doc = bson::to_document(&AgreementDoc::default()).unwrap();
        assert_eq!(doc.get_str("activeStatus").unwrap(), "active");
        assert_eq!(Bson::from(ActiveStatus::Inactive), Bson::String("inactive".into()));
    }

    #[test]
    fn test_unset_references_are_omitted() {
        let doc = bson::to_document(&AgreementDoc::default()).unwrap();
        assert!(!doc.contains_key("_id"));
        assert!(!doc.contains_key("manager"));
        assert!(!doc.contains_key("workPlan"));
        assert!(!doc.contains_key("details"));
    }

    #[test]
    fn test_decodes_stored_layout() {
        let manager = ObjectId::new();
        let agreement: AgreementDoc = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "registerNumber": "2024/001",
            "activeStatus": "inactive",
            "manager": manager,
        })
        .unwrap();

        assert_eq!(agreement.register_number, "2024/001");
        assert!(!agreement.is_active());
        assert_eq!(agreement.manager_id(), Some(manager));
        assert!(agreement.work_plan.is_none());
    }
}
