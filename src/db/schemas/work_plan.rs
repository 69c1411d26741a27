//! Work plan chain: work plan -> product -> cost items -> category
//!
//! Each level is its own collection and references the next by id, so any
//! level may be present without the ones below it.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::schemas::{Identified, Metadata, Ref};

/// Collection name for work plans
pub const WORK_PLAN_COLLECTION: &str = "workplans";

/// Collection name for products
pub const PRODUCT_COLLECTION: &str = "products";

/// Collection name for cost items
pub const COST_ITEM_COLLECTION: &str = "costitems";

/// Collection name for cost categories
pub const CATEGORY_COLLECTION: &str = "categories";

/// Execution plan attached to an agreement
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkPlanDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Ref<ProductDoc>>,
}

/// Deliverable of a work plan
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub cost_items: Vec<Ref<CostItemDoc>>,
}

/// Budget line of a product
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostItemDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    pub unit_value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Ref<CategoryDoc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Identified for WorkPlanDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl Identified for ProductDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl Identified for CostItemDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl Identified for CategoryDoc {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
