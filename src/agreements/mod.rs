//! Agreement aggregate access
//!
//! Different callers (project managers, reviewers, general managers,
//! association administrators) each see their own slice of the agreement set,
//! with a hydration depth that matches what their view shows.

pub mod payload;
pub mod query;
pub mod repository;

pub use payload::{AgreementPatch, NewAgreement, ReferenceTarget};
pub use query::{AgreementQuery, StatusScope};
pub use repository::AgreementRepository;
