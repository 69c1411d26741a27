//! Document storage
//!
//! The repositories talk to storage only through [`DocumentStore`].
//! [`MongoStore`] is the production backend; [`MemoryStore`] runs in-process.

pub mod memory;
pub mod mongo;
pub mod populate;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{IntoIndexes, MongoStore};
pub use populate::{populate, Populate};
pub use store::DocumentStore;
