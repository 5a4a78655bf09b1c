//! A library catalog of authors, books, genres and book copies, with
//! referential integrity enforced above a document store that has none.
//!
//! The store ([`libris_core`]) only knows keyed documents and field filters.
//! This crate adds the relationships on top:
//!
//! - **Entity schemas** ([`model`]) - Stored shapes and typed ids
//! - **Derived fields** ([`derived`]) - Display names, formatted dates, canonical paths
//! - **Relationship resolver** ([`resolver`]) - Concurrent fan-out lookups joined by id
//! - **Integrity-guarded mutator** ([`mutator`]) - Deletes refuse while dependents exist
//! - **Validation pipeline** ([`validation`]) - Declarative field rules, all failures collected
//! - **Catalog workflows** ([`catalog`]) - The entry points a presentation layer calls
//!
//! # Quick Start
//!
//! ```ignore
//! use libris::prelude::*;
//!
//! let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//! let catalog = Catalog::new(store);
//!
//! let outcome = catalog
//!     .create_genre(&FormData::new().with("name", "Sci-Fi"))
//!     .await?;
//!
//! if let SaveOutcome::Saved { path } = outcome {
//!     println!("created {path}");
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod derived;
pub mod error;
pub mod model;
pub mod mutator;
pub mod prelude;
pub mod resolver;
pub mod seed;
pub mod validation;
pub mod view;

pub use libris_core::{backend, document, query, store};

/// In-memory storage backend.
pub mod memory {
    pub use libris_memory::{InMemoryStore, InMemoryStoreBuilder};
}
