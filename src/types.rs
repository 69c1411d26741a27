//! Shared error and result types

use bson::oid::ObjectId;

/// Errors surfaced by the data-access core
#[derive(Debug, thiserror::Error)]
pub enum SolError {
    /// No document matched an id-based read, update or delete
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The document store failed or could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A reference points at a document that does not exist
    #[error("Invalid reference in '{field}': {id} does not exist")]
    InvalidReference { field: &'static str, id: String },

    /// An identity string is not a valid document id
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// A document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SolError {
    /// Build a not-found error for an entity and id
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error is a not-found signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<bson::ser::Error> for SolError {
    fn from(e: bson::ser::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bson::de::Error> for SolError {
    fn from(e: bson::de::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for the data-access core
pub type Result<T> = std::result::Result<T, SolError>;

/// Parse an inbound identity string into a document id
pub fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| SolError::InvalidId(id.to_string()))
}

/// Parse a set of identity strings, failing on the first malformed entry
pub fn parse_ids<S: AsRef<str>>(ids: &[S]) -> Result<Vec<ObjectId>> {
    ids.iter().map(|id| parse_id(id.as_ref())).collect()
}
