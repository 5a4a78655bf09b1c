//! Catalog error and result types.
//!
//! Only three things can go wrong in a catalog workflow: the addressed record
//! does not exist, a derived value was asked for on a record that cannot
//! supply it, or the store itself failed. Field validation failures and
//! blocked deletes are outcomes, not errors (see [`crate::catalog`]).

use std::fmt::Display;

use libris_core::{document::Document, error::DocumentStoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The addressed record is absent. Presentation layers map this to a 404.
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },
    /// A derived value was requested from a record that does not hold the
    /// inputs it needs.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// The store call failed. Propagated uninterpreted.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] DocumentStoreError),
}

impl CatalogError {
    /// A `NotFound` for the collection that holds `D`.
    pub fn missing<D: Document>(id: impl Display) -> Self {
        CatalogError::NotFound {
            entity: D::collection_name().to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

impl From<DocumentStoreError> for CatalogError {
    fn from(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::DocumentNotFound(id, collection) => CatalogError::NotFound { entity: collection, id },
            other => CatalogError::StoreUnavailable(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
