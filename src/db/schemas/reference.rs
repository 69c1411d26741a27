//! Weak references between documents
//!
//! A reference is stored as the target's `_id`. After hydration the same
//! field holds the embedded target document. Neither state owns the target.

use bson::{oid::ObjectId, Bson};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Documents that carry their own `_id`
pub trait Identified {
    fn id(&self) -> Option<ObjectId>;
}

/// A reference field, either unresolved or hydrated
#[derive(Clone, Debug, PartialEq)]
pub enum Ref<T> {
    /// Only the target id is known
    Id(ObjectId),
    /// The target document, resolved by the store
    Populated(Box<T>),
}

impl<T: Identified> Ref<T> {
    /// The referenced id, in either state
    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Ref::Id(id) => Some(*id),
            Ref::Populated(doc) => doc.id(),
        }
    }
}

impl<T> Ref<T> {
    /// The hydrated target, if this reference was resolved
    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Populated(doc) => Some(doc.as_ref()),
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Ref::Populated(_))
    }
}

impl<T: Serialize> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ref::Id(id) => id.serialize(serializer),
            Ref::Populated(doc) => doc.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Ref<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::ObjectId(id) => Ok(Ref::Id(id)),
            Bson::String(hex) => ObjectId::parse_str(&hex).map(Ref::Id).map_err(D::Error::custom),
            Bson::Document(doc) => bson::from_document(doc)
                .map(|target| Ref::Populated(Box::new(target)))
                .map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "expected a reference id or document, found {:?}",
                other.element_type()
            ))),
        }
    }
}
