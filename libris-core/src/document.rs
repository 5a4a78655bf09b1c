//! Core traits for document representation and serialization.
//!
//! A document is any serde type that knows its own identifier and the
//! collection it lives in. Documents are stored as BSON; relationships between
//! documents are plain identifier fields and are never resolved by the store.

use bson::{Bson, Uuid, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Core trait that all documents stored in a document store must implement.
///
/// # Example
///
/// ```ignore
/// use libris_core::document::Document;
/// use bson::Uuid;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Shelf {
///     pub id: Uuid,
///     pub label: String,
/// }
///
/// impl Document for Shelf {
///     fn id(&self) -> &Uuid {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "shelves"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns a reference to this document's unique identifier.
    fn id(&self) -> &Uuid;

    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing BSON conversion for documents.
///
/// Automatically implemented for every [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a document from a stored BSON value.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }
}

/// Serializes a set of named fields into a BSON document suitable for a
/// partial update.
///
/// Fails with [`DocumentStoreError::InvalidDocument`] when `fields` does not
/// serialize to a map.
pub fn fields_to_document<T: Serialize>(fields: &T) -> DocumentStoreResult<bson::Document> {
    match serialize_to_bson(fields)? {
        Bson::Document(document) => Ok(document),
        other => Err(DocumentStoreError::InvalidDocument(format!(
            "expected a field map, got {:?}",
            other.element_type()
        ))),
    }
}
