//! Plain records handed to the presentation layer.
//!
//! Ids are rendered as strings and every derived field is already computed,
//! so a template only ever reads fields.

use serde::Serialize;

use crate::{
    derived,
    model::{Author, Book, BookInstance, BookSummary, Genre},
    validation::{FieldError, SanitizedForm},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorView {
    pub id: String,
    pub first_name: String,
    pub family_name: String,
    pub name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
    pub lifespan: String,
    pub path: String,
}

impl From<&Author> for AuthorView {
    fn from(author: &Author) -> Self {
        AuthorView {
            id: author.id.to_string(),
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            name: derived::display_name(author),
            date_of_birth: derived::formatted_date(author.date_of_birth),
            date_of_death: derived::formatted_date(author.date_of_death),
            lifespan: derived::lifespan(author),
            path: derived::canonical_path(author),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreView {
    pub id: String,
    pub name: String,
    pub path: String,
}

impl From<&Genre> for GenreView {
    fn from(genre: &Genre) -> Self {
        GenreView {
            id: genre.id.to_string(),
            name: genre.name.clone(),
            path: derived::canonical_path(genre),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub author: Option<String>,
    pub genre: Vec<String>,
    pub path: String,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        BookView {
            id: book.id.to_string(),
            title: book.title.clone(),
            summary: book.summary.clone(),
            author: book.author.map(|id| id.to_string()),
            genre: book.genre.iter().map(ToString::to_string).collect(),
            path: derived::canonical_path(book),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceView {
    pub id: String,
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
    pub due_back_formatted: String,
    pub path: String,
}

impl From<&BookInstance> for InstanceView {
    fn from(instance: &BookInstance) -> Self {
        InstanceView {
            id: instance.id.to_string(),
            book: instance.book.to_string(),
            imprint: instance.imprint.clone(),
            status: instance.status.to_string(),
            due_back: derived::formatted_date(instance.due_back),
            due_back_formatted: derived::due_back_formatted(instance),
            path: derived::canonical_path(instance),
        }
    }
}

/// Converts a slice of records into views.
pub fn views<'a, T: 'a, V: From<&'a T>>(records: &'a [T]) -> Vec<V> {
    records.iter().map(V::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorDetail {
    pub author: AuthorView,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreDetail {
    pub genre: GenreView,
    pub books: Vec<BookView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDetail {
    pub book: BookView,
    /// `None` when the book has no author or its author no longer resolves.
    pub author: Option<AuthorView>,
    pub genres: Vec<GenreView>,
    pub instances: Vec<InstanceView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceDetail {
    pub instance: InstanceView,
    /// `None` when the referenced book no longer resolves.
    pub book: Option<BookView>,
}

/// A record and everything that would block deleting it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletePreview<O, D> {
    pub owner: O,
    pub dependents: Vec<D>,
}

/// Choices offered by the book form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookChoices {
    pub authors: Vec<AuthorView>,
    pub genres: Vec<GenreView>,
}

/// A book prefilled for editing, with the choices its form offers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookForm {
    pub book: BookView,
    pub choices: BookChoices,
}

/// A copy prefilled for editing, with the books it may reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceForm {
    pub instance: InstanceView,
    pub books: Vec<BookView>,
}

/// Result of a create or update workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Redirect to `path`.
    Saved { path: String },
    /// Re-render the form with `errors`, prefilled from `form`.
    Invalid { errors: Vec<FieldError>, form: SanitizedForm },
}

impl SaveOutcome {
    pub fn path(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved { path } => Some(path),
            SaveOutcome::Invalid { .. } => None,
        }
    }
}

/// Result of a delete workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome<D> {
    /// Redirect to the listing at `path`.
    Deleted { path: String },
    /// Nothing was deleted; `dependents` must be removed or reassigned first.
    Blocked { dependents: Vec<D> },
}
