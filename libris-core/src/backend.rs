//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the whole contract the catalog needs from a
//! storage engine: keyed insert, partial update, delete, fetch by id, and
//! field-filtered queries. Backends know nothing about relationships between
//! collections; a document holding another document's id is just a document
//! holding a value.
//!
//! # Examples
//!
//! ```ignore
//! use libris_core::backend::StoreBackend;
//! use bson::{Uuid, Bson, doc};
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = Uuid::new();
//! let document = Bson::Document(doc! { "name": "Fantasy" });
//! backend.insert_documents(vec![(id, document)], "genres").await?;
//! ```

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument, Uuid};
use std::fmt::Debug;

use crate::{error::DocumentStoreResult, query::Query};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the catalog issues independent reads
/// against the same backend concurrently from within one task.
///
/// # Atomicity
///
/// Each call is atomic on its own. No call spans two collections and no lock
/// is held between calls, so callers that check one collection and then write
/// another accept that the first result may be stale by the time of the write.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts new documents into a collection.
    ///
    /// The collection is created on first insert. Fails with
    /// [`DocumentAlreadyExists`](crate::error::DocumentStoreError::DocumentAlreadyExists)
    /// if any id is already present.
    async fn insert_documents(
        &self,
        documents: Vec<(Uuid, Bson)>,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Overwrites the named fields of existing documents, leaving other
    /// fields untouched, and returns the updated documents in request order.
    ///
    /// Fails with
    /// [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)
    /// if any id is absent.
    async fn update_documents(
        &self,
        updates: Vec<(Uuid, BsonDocument)>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Deletes documents by id.
    ///
    /// Fails with
    /// [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)
    /// if any id is absent.
    async fn delete_documents(&self, ids: Vec<Uuid>, collection: &str) -> DocumentStoreResult<()>;

    /// Retrieves documents by id. Unknown ids are omitted from the result.
    async fn get_documents(
        &self,
        ids: Vec<Uuid>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Returns the documents matching `query`, after sorting, offset, limit
    /// and projection. A collection that does not exist yields no documents.
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Bson>>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
