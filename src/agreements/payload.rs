//! Write payloads for agreements

use bson::{oid::ObjectId, Bson, DateTime, Document};
use serde::Serialize;

use crate::db::schemas::{
    ActiveStatus, AgreementDoc, Ref, ASSOCIATION_COLLECTION, PROJECT_COLLECTION, USER_COLLECTION,
    WORK_PLAN_COLLECTION,
};
use crate::types::Result;

const DETAILS_FIELD: &str = "details";

/// A reference id supplied by a caller, with the collection it must exist in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTarget {
    pub field: &'static str,
    pub collection: &'static str,
    pub id: ObjectId,
}

fn reference_targets(
    association: Option<ObjectId>,
    manager: Option<ObjectId>,
    reviewer: Option<ObjectId>,
    project: Option<ObjectId>,
    work_plan: Option<ObjectId>,
) -> Vec<ReferenceTarget> {
    [
        ("association", ASSOCIATION_COLLECTION, association),
        ("manager", USER_COLLECTION, manager),
        ("reviewer", USER_COLLECTION, reviewer),
        ("project", PROJECT_COLLECTION, project),
        ("workPlan", WORK_PLAN_COLLECTION, work_plan),
    ]
    .into_iter()
    .filter_map(|(field, collection, id)| {
        id.map(|id| ReferenceTarget {
            field,
            collection,
            id,
        })
    })
    .collect()
}

/// Payload for registering a new agreement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAgreement {
    pub register_number: String,
    pub register_object: String,
    pub value: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub signature_date: Option<DateTime>,
    pub validity_date: Option<DateTime>,
    pub details: Document,
    pub association: Option<ObjectId>,
    pub manager: Option<ObjectId>,
    pub reviewer: Option<ObjectId>,
    pub project: Option<ObjectId>,
    pub work_plan: Option<ObjectId>,
}

impl NewAgreement {
    pub fn references(&self) -> Vec<ReferenceTarget> {
        reference_targets(
            self.association,
            self.manager,
            self.reviewer,
            self.project,
            self.work_plan,
        )
    }
}

impl From<NewAgreement> for AgreementDoc {
    fn from(new: NewAgreement) -> Self {
        Self {
            id: None,
            metadata: Default::default(),
            register_number: new.register_number,
            register_object: new.register_object,
            value: new.value,
            city: new.city,
            state: new.state,
            signature_date: new.signature_date,
            validity_date: new.validity_date,
            details: new.details,
            active_status: ActiveStatus::Active,
            association: new.association.map(Ref::Id),
            manager: new.manager.map(Ref::Id),
            reviewer: new.reviewer.map(Ref::Id),
            project: new.project.map(Ref::Id),
            work_plan: new.work_plan.map(Ref::Id),
        }
    }
}

/// Partial update. Only the fields that are `Some` are written; references
/// are replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_date: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_date: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Document>,
    /// Setting `Active` restores a soft-deleted agreement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_status: Option<ActiveStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_plan: Option<ObjectId>,
}

impl AgreementPatch {
    /// The `$set` body for this patch.
    ///
    /// Opaque `details` keys are written as `details.<key>` so keys the patch
    /// leaves out keep their stored values.
    pub fn to_set(&self) -> Result<Document> {
        let mut set = bson::to_document(self)?;
        if let Some(Bson::Document(details)) = set.remove(DETAILS_FIELD) {
            for (key, value) in details {
                set.insert(format!("{DETAILS_FIELD}.{key}"), value);
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn references(&self) -> Vec<ReferenceTarget> {
        reference_targets(
            self.association,
            self.manager,
            self.reviewer,
            self.project,
            self.work_plan,
        )
    }
}
