//! In-memory document storage backend for libris.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait, used by the bootstrap binary and the test suites.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Type-erased storage** - Stores documents as BSON
//! - **Query support** - Filtering, sorting, offset/limit and field projection
//!
//! # Quick Start
//!
//! ```ignore
//! use libris_core::{backend::StoreBackendBuilder, store::DocumentStore};
//! use libris_memory::InMemoryStore;
//!
//! let backend = InMemoryStore::builder().build().await?;
//! let store = DocumentStore::new(backend);
//! let genres = store.typed_collection::<Genre>();
//! ```

#[allow(unused_extern_crates)]
extern crate self as libris_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
