//! sol-store - data-access core of the SOL workflow backend
//!
//! Resolves the Agreement aggregate and its graph of related entities
//! (association, manager, reviewer, project, work plan -> product ->
//! cost items -> category) over a document store, with role-scoped listings
//! and soft deletion. Also holds the one-binding-per-user TFA store.
//!
//! ## Modules
//!
//! - **agreements**: query shapes, hydration profiles and the repository
//! - **tfa**: second-factor credential bindings
//! - **db**: the `DocumentStore` adapter trait, MongoDB and in-memory backends,
//!   reference hydration and document schemas

pub mod agreements;
pub mod config;
pub mod db;
pub mod tfa;
pub mod types;

pub use agreements::{AgreementPatch, AgreementRepository, NewAgreement};
pub use config::Args;
pub use tfa::{NewTfa, TfaStore, TfaSummary};
pub use types::{Result, SolError};

use std::sync::Arc;

use db::DocumentStore;

/// Both repositories over one shared store
#[derive(Clone)]
pub struct Repositories {
    pub agreements: AgreementRepository,
    pub tfa: TfaStore,
}

impl Repositories {
    pub fn new(store: Arc<dyn DocumentStore>, reference_checks: bool) -> Self {
        Self {
            agreements: AgreementRepository::new(store.clone())
                .with_reference_checks(reference_checks),
            tfa: TfaStore::new(store),
        }
    }
}
