//! Convenient re-exports of the types most callers need.
//!
//! ```ignore
//! use libris::prelude::*;
//! ```

pub use libris_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    store::DocumentStore,
};
pub use libris_memory::InMemoryStore;

pub use crate::{
    catalog::Catalog,
    config::LibrisConfig,
    error::{CatalogError, CatalogResult},
    model::{Author, AuthorId, Book, BookId, BookInstance, BookInstanceId, Genre, GenreId, InstanceStatus},
    mutator::{Checked, Deletion, Mutator},
    resolver::Resolver,
    validation::{FieldError, FormData, Validation},
    view::{DeleteOutcome, SaveOutcome},
};
