//! Common metadata for all documents
//!
//! Tracks creation and update timestamps. Soft deletion is modelled per
//! aggregate (see `ActiveStatus`), not here.

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Field path of the update timestamp, for `$set` documents
pub const UPDATED_AT_PATH: &str = "metadata.updatedAt";

/// Common metadata for all documents
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// When the document was last updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    /// When the document was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}
