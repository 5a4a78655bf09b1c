//! Typed collection access.
//!
//! [`TypedCollection`] is the per-collection client the catalog talks to:
//! lookup by id, lookup by field, insert, partial update and delete, with
//! documents converted to and from BSON on the way through.
//!
//! # Example
//!
//! ```ignore
//! let genres = store.typed_collection::<Genre>();
//! let id = genres.insert(genre).await?;
//! let found = genres.find_by_id(id).await?;
//! ```

use bson::{Document as BsonDocument, Uuid, de::deserialize_from_bson};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, Query},
};

#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a document and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentAlreadyExists`] if the id is taken.
    pub async fn insert(&self, document: D) -> DocumentStoreResult<Uuid> {
        let id = *document.id();

        self.backend
            .insert_documents(vec![(id, document.to_bson()?)], self.name())
            .await?;

        Ok(id)
    }

    /// Fetches a single document, or `None` if no document has this id.
    pub async fn find_by_id(&self, id: impl Into<Uuid>) -> DocumentStoreResult<Option<D>> {
        self.backend
            .get_documents(vec![id.into()], self.name())
            .await?
            .into_iter()
            .next()
            .map(D::from_bson)
            .transpose()
    }

    /// Fetches every document with one of the given ids. Unknown ids are skipped.
    pub async fn find_by_ids<U>(&self, ids: Vec<U>) -> DocumentStoreResult<Vec<D>>
    where
        U: Into<Uuid>,
    {
        self.backend
            .get_documents(ids.into_iter().map(Into::into).collect(), self.name())
            .await?
            .into_iter()
            .map(D::from_bson)
            .collect()
    }

    /// Fetches every document matching the filter.
    pub async fn find_by(&self, filter: Expr) -> DocumentStoreResult<Vec<D>> {
        self.find(Query::filtered(filter)).await
    }

    /// Runs a full query and decodes the results as `D`.
    pub async fn find(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        self.backend
            .query_documents(query, self.name())
            .await?
            .into_iter()
            .map(D::from_bson)
            .collect()
    }

    /// Runs a query and decodes the results as the projection type `P`.
    ///
    /// Intended for queries carrying a projection, so that `P` only ever sees
    /// the fields it asked for.
    pub async fn find_projected<P>(&self, query: Query) -> DocumentStoreResult<Vec<P>>
    where
        P: DeserializeOwned,
    {
        self.backend
            .query_documents(query, self.name())
            .await?
            .into_iter()
            .map(|doc| deserialize_from_bson::<P>(doc).map_err(DocumentStoreError::from))
            .collect()
    }

    /// Overwrites the named fields of one document and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if no document has this id.
    pub async fn update_by_id(&self, id: impl Into<Uuid>, fields: BsonDocument) -> DocumentStoreResult<D> {
        let id = id.into();

        self.backend
            .update_documents(vec![(id, fields)], self.name())
            .await?
            .into_iter()
            .next()
            .map(D::from_bson)
            .unwrap_or_else(|| {
                Err(DocumentStoreError::DocumentNotFound(id.to_string(), self.name.clone()))
            })
    }

    /// Deletes one document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if no document has this id.
    pub async fn delete_by_id(&self, id: impl Into<Uuid>) -> DocumentStoreResult<()> {
        self.backend
            .delete_documents(vec![id.into()], self.name())
            .await
    }
}
