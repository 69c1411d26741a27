//! Database schemas
//!
//! Defines MongoDB document structures for agreements, the entities they
//! reference, and TFA bindings.

mod agreement;
mod metadata;
mod reference;
mod related;
mod tfa;
mod work_plan;

pub use agreement::{ActiveStatus, AgreementDoc, AGREEMENT_COLLECTION};
pub use metadata::{Metadata, UPDATED_AT_PATH};
pub use reference::{Identified, Ref};
pub use related::{
    AssociationDoc, ProjectDoc, UserDoc, ASSOCIATION_COLLECTION, PROJECT_COLLECTION,
    USER_COLLECTION,
};
pub use tfa::{TfaDoc, TFA_COLLECTION};
pub use work_plan::{
    CategoryDoc, CostItemDoc, ProductDoc, WorkPlanDoc, CATEGORY_COLLECTION, COST_ITEM_COLLECTION,
    PRODUCT_COLLECTION, WORK_PLAN_COLLECTION,
};
