//! Second-factor authentication bindings

pub mod store;

pub use store::{NewTfa, TfaStore, TfaSummary};
