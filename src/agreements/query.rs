//! Agreement query shapes
//!
//! Every read the repository performs is one [`AgreementQuery`]: a role
//! filter, a [`StatusScope`] and a hydration profile. The active-status clause
//! is only ever added by [`AgreementQuery::filter`].

use bson::{doc, oid::ObjectId, Document};

use crate::db::schemas::{
    ActiveStatus, ASSOCIATION_COLLECTION, CATEGORY_COLLECTION, COST_ITEM_COLLECTION,
    PRODUCT_COLLECTION, PROJECT_COLLECTION, USER_COLLECTION, WORK_PLAN_COLLECTION,
};
use crate::db::Populate;

const ASSOCIATION: Populate = Populate::leaf("association", ASSOCIATION_COLLECTION);
const MANAGER: Populate = Populate::leaf("manager", USER_COLLECTION);
const PROJECT: Populate = Populate::leaf("project", PROJECT_COLLECTION);
const WORK_PLAN: Populate = Populate::leaf("workPlan", WORK_PLAN_COLLECTION);

const CATEGORY: Populate = Populate::leaf("category", CATEGORY_COLLECTION);
const COST_ITEMS: Populate = Populate {
    path: "costItems",
    from: COST_ITEM_COLLECTION,
    nested: &[CATEGORY],
};
const PRODUCT: Populate = Populate {
    path: "product",
    from: PRODUCT_COLLECTION,
    nested: &[COST_ITEMS],
};

/// workPlan -> product -> costItems -> category
pub const WORK_PLAN_CHAIN: Populate = Populate {
    path: "workPlan",
    from: WORK_PLAN_COLLECTION,
    nested: &[PRODUCT],
};

/// Hydration profiles, one per caller view
pub mod profile {
    use super::*;

    pub const NONE: &[Populate] = &[];
    pub const WORK_PLAN_ONLY: &[Populate] = &[WORK_PLAN];
    /// Single-agreement detail view
    pub const DETAIL: &[Populate] = &[WORK_PLAN, ASSOCIATION, MANAGER, PROJECT];
    /// Listings that show budget data
    pub const LISTING: &[Populate] = &[ASSOCIATION, MANAGER, WORK_PLAN_CHAIN];
    pub const PROJECT_LISTING: &[Populate] = &[ASSOCIATION, PROJECT, MANAGER, WORK_PLAN_CHAIN];
}

/// Whether a query sees soft-deleted agreements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScope {
    /// Only `activeStatus == active`
    ActiveOnly,
    /// Status is not filtered
    Any,
}

/// One parameterized agreement read
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementQuery {
    selector: Document,
    scope: StatusScope,
    hydration: &'static [Populate],
    matches_nothing: bool,
}

impl AgreementQuery {
    fn new(selector: Document, scope: StatusScope, hydration: &'static [Populate]) -> Self {
        Self {
            selector,
            scope,
            hydration,
            matches_nothing: false,
        }
    }

    pub fn by_id(id: ObjectId) -> Self {
        Self::new(doc! { "_id": id }, StatusScope::Any, profile::DETAIL)
    }

    pub fn by_reviewer_or_manager(user: ObjectId) -> Self {
        Self::new(
            doc! { "$or": [{ "manager": user }, { "reviewer": user }] },
            StatusScope::Any,
            profile::NONE,
        )
    }

    pub fn by_reviewer(user: ObjectId) -> Self {
        Self::new(doc! { "reviewer": user }, StatusScope::Any, profile::NONE)
    }

    pub fn by_manager(user: ObjectId) -> Self {
        Self::new(
            doc! { "manager": user },
            StatusScope::Any,
            profile::WORK_PLAN_ONLY,
        )
    }

    /// First agreement of a project, any status
    pub fn first_for_project(project: ObjectId) -> Self {
        Self::new(
            doc! { "project": project },
            StatusScope::Any,
            profile::WORK_PLAN_ONLY,
        )
    }

    pub fn all_active() -> Self {
        Self::new(Document::new(), StatusScope::ActiveOnly, profile::LISTING)
    }

    /// Agreements whose id is not in `ids`, any status
    pub fn excluding(ids: Vec<ObjectId>) -> Self {
        Self::new(
            doc! { "_id": { "$nin": ids } },
            StatusScope::Any,
            profile::NONE,
        )
    }

    /// Active agreements whose id is in `ids`. An empty set selects nothing.
    pub fn including(ids: Vec<ObjectId>) -> Self {
        let matches_nothing = ids.is_empty();
        Self {
            matches_nothing,
            ..Self::new(
                doc! { "_id": { "$in": ids } },
                StatusScope::ActiveOnly,
                profile::LISTING,
            )
        }
    }

    pub fn for_association(association: ObjectId) -> Self {
        Self::new(
            doc! { "association": association },
            StatusScope::ActiveOnly,
            profile::LISTING,
        )
    }

    /// General project manager's view of the agreements they manage
    pub fn for_general_manager(manager: ObjectId) -> Self {
        Self::new(
            doc! { "manager": manager },
            StatusScope::ActiveOnly,
            profile::LISTING,
        )
    }

    pub fn for_project(project: ObjectId) -> Self {
        Self::new(
            doc! { "project": project },
            StatusScope::ActiveOnly,
            profile::PROJECT_LISTING,
        )
    }

    /// The store filter, with the status clause composed in
    pub fn filter(&self) -> Document {
        let mut filter = self.selector.clone();
        if self.scope == StatusScope::ActiveOnly {
            filter.insert("activeStatus", ActiveStatus::Active);
        }
        filter
    }

    pub fn scope(&self) -> StatusScope {
        self.scope
    }

    pub fn hydration(&self) -> &'static [Populate] {
        self.hydration
    }

    /// True when the query cannot match any document and needs no round trip
    pub fn matches_nothing(&self) -> bool {
        self.matches_nothing
    }
}
