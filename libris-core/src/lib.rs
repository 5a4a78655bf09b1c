//! The document-store contract the libris catalog is written against.
//!
//! This crate provides:
//!
//! - **Document traits** ([`document`]) - Identity, collection naming and BSON conversion
//! - **Store backend abstraction** ([`backend`]) - The keyed find/insert/update/delete contract
//! - **Query and filtering API** ([`query`]) - Field filters, sorting and projections
//! - **Typed collections** ([`collection`]) - Per-collection client over a backend
//! - **Document store** ([`store`]) - Entry point binding a backend to typed collections
//! - **Error handling** ([`error`]) - Store error and result types
//!
//! The store has no notion of a relationship. References between documents
//! are ordinary id-valued fields and all integrity rules live above this crate.

#[allow(unused_extern_crates)]
extern crate self as libris_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod store;
