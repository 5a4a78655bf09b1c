//! Stored shapes of the four catalog entities.
//!
//! Relationships are weak references: a [`Book`] holds an [`AuthorId`] and a
//! set of [`GenreId`]s, a [`BookInstance`] holds a [`BookId`]. Nothing in the
//! store checks that these resolve; [`crate::mutator`] does.
//!
//! Every non-id field carries a serde default, so a sparse record still reads.
//! Each entity also has a `*Fields` struct holding its writable fields, which
//! doubles as the partial-update document.

mod author;
mod book;
mod genre;
mod id;
mod instance;

pub use author::{Author, AuthorFields};
pub use book::{Book, BookFields, BookSummary};
pub use genre::{Genre, GenreFields};
pub use id::{AuthorId, BookId, BookInstanceId, GenreId};
pub use instance::{BookInstance, InstanceFields, InstanceStatus};

use libris_core::document::Document;

/// A document addressable by a canonical path.
pub trait Resource: Document {
    /// Path segment for a single record, e.g. `author` in `/author/{id}`.
    const ROUTE: &'static str;
    /// Path segment for the listing, e.g. `authors`.
    const LIST_ROUTE: &'static str;
}
