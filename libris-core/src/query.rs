//! Field filters, sorting and projection.
//!
//! The store has no joins, so every relationship lookup is expressed as a
//! field filter over the referencing collection:
//!
//! ```ignore
//! use libris_core::query::{Query, Filter, SortDirection};
//!
//! // every book whose `author` field holds this id, title and summary only
//! let query = Query::builder()
//!     .filter(Filter::eq("author", author_id))
//!     .sort("title", SortDirection::Asc)
//!     .project(["title", "summary"])
//!     .build();
//! ```
//!
//! Backends evaluate the [`Expr`] against each stored document.

use bson::Bson;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// How a field is compared against a filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    Eq,
    /// Array field holds the value, or string field contains it.
    Contains,
}

/// A single field comparison. A document lacking the field never matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub field: String,
    pub op: FieldOp,
    pub value: Bson,
}

/// Constructors for filter expressions.
pub struct Filter;

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr { field: field.into(), op: FieldOp::Eq, value: value.into() }
    }

    /// Matches documents whose array field holds `value`, which is how a
    /// many-valued reference such as a book's genres is looked up.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr { field: field.into(), op: FieldOp::Contains, value: value.into() }
    }
}

/// A filter plus the shape of the result: order, window and projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<Expr>,
    pub sort: Option<Sort>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    /// When set, only these top-level fields are returned.
    pub projection: Option<Vec<String>>,
}

impl Query {
    /// A query matching every document, in backend order.
    pub fn new() -> Self {
        Query::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    pub fn filtered(filter: Expr) -> Self {
        Query { filter: Some(filter), ..Query::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field: field.into(), direction });
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Restricts returned documents to the named top-level fields.
    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}
