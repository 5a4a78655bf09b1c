use bson::Uuid;
use libris_core::document::Document;
use serde::{Deserialize, Serialize};

use super::{AuthorId, BookId, GenreId, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub author: Option<AuthorId>,
    #[serde(default)]
    pub genre: Vec<GenreId>,
}

impl Document for Book {
    fn id(&self) -> &Uuid {
        self.id.as_uuid()
    }

    fn collection_name() -> &'static str {
        "books"
    }
}

impl Resource for Book {
    const ROUTE: &'static str = "book";
    const LIST_ROUTE: &'static str = "books";
}

/// The `{title, summary}` projection of a book, as listed on an author's page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

impl BookSummary {
    /// Field names to request from the store.
    pub const FIELDS: [&'static str; 2] = ["title", "summary"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookFields {
    pub title: String,
    pub summary: String,
    pub author: Option<AuthorId>,
    pub genre: Vec<GenreId>,
}

impl BookFields {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            summary: self.summary,
            author: self.author,
            genre: self.genre,
        }
    }
}
