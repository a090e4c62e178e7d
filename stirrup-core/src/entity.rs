//! Core trait and serialization utilities for persisted entity types.
//!
//! An entity is any serde-serializable record type. The binding between an
//! entity type and its collection is derived from the type name unless the
//! implementation overrides it.

use bson::{Bson, Document, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A record type that can be persisted in a document collection.
///
/// Serialization is schema-driven through serde; no per-field binding is
/// required. The default collection binding is derived from the type's
/// simple name (see [`derived_collection_name`]) and can be overridden by
/// the implementation.
///
/// # Example
///
/// ```ignore
/// use serde::{Serialize, Deserialize};
/// use stirrup_core::entity::Entity;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Order {
///     pub id: u64,
///     pub status: String,
/// }
///
/// impl Entity for Order {}
///
/// assert_eq!(Order::collection_name(), "order");
/// ```
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static {
    /// The name of the collection this entity type is persisted in.
    ///
    /// Defaults to the lower-cased simple type name with any generic
    /// parameter suffix stripped.
    fn collection_name() -> String {
        derived_collection_name::<Self>()
    }
}

/// Derives the default collection name for a type.
///
/// The module path and any trailing generic-parameter suffix are stripped
/// from the full type name, and the remainder is lower-cased: `Order` and
/// `orders::Order<Variant>` both bind to `order`.
pub fn derived_collection_name<T: ?Sized>() -> String {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    let simple = base.rsplit("::").next().unwrap_or(base);

    simple.to_ascii_lowercase()
}

/// Extension trait converting entities to and from BSON documents.
///
/// Implemented for every [`Entity`]; the repository uses it on both the
/// insert and the decode path.
pub trait EntityExt: Entity {
    /// Serializes this entity into a BSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if serialization fails or the
    /// entity does not serialize to a document (e.g. a bare scalar type).
    fn to_document(&self) -> StoreResult<Document>;

    /// Deserializes an entity from a BSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the document does not match
    /// the entity's shape.
    fn from_document(document: Document) -> StoreResult<Self>;
}

impl<T: Entity> EntityExt for T {
    fn to_document(&self) -> StoreResult<Document> {
        serialize_to_bson(self)?
            .as_document()
            .cloned()
            .ok_or_else(|| {
                StoreError::Serialization(format!(
                    "{} did not serialize to a document",
                    std::any::type_name::<T>()
                ))
            })
    }

    fn from_document(document: Document) -> StoreResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }
}
