//! Entities an agreement points at: associations, users and projects
//!
//! These collections are owned by other parts of the backend. This crate only
//! reads them when hydrating agreement references.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::schemas::{Identified, Metadata};

/// Collection name for associations
pub const ASSOCIATION_COLLECTION: &str = "associations";

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// Collection name for projects
pub const PROJECT_COLLECTION: &str = "projects";

/// Partner association that signs an agreement
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub name: String,

    /// National registration number of the association
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Backend user acting as manager or reviewer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    /// Role name, e.g. "manager", "reviewer", "project_manager"
    #[serde(default)]
    pub role: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Identified for AssociationDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl Identified for UserDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl Identified for ProjectDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
