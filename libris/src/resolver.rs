//! Relationship resolution over a store without joins.
//!
//! Every one-to-many relationship is stored on the "many" side as an id
//! field, so resolving it means querying the referencing collection by that
//! field. A resolution that needs the owner and its dependents issues both
//! lookups at once and joins them with [`futures::try_join!`]: the join waits
//! for every branch, and the first error fails the whole resolution. No
//! partial join is ever returned.

use bson::Uuid;
use futures::try_join;
use libris_core::{
    backend::StoreBackend,
    document::Document,
    query::{Filter, Query, SortDirection},
    store::DocumentStore,
};
use tracing::debug;

use crate::{
    error::{CatalogError, CatalogResult},
    model::{Author, AuthorId, Book, BookId, BookInstance, BookInstanceId, BookSummary, Genre, GenreId},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorWithBooks {
    pub author: Author,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreWithBooks {
    pub genre: Genre,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookWithInstances {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceWithBook {
    pub instance: BookInstance,
    pub book: Option<Book>,
}

/// An owner lookup joined with every record referencing it.
///
/// `owner` is `None` when the owner does not exist; `dependents` may still be
/// non-empty in that case (they dangle).
#[derive(Debug, Clone, PartialEq)]
pub struct Dependents<O, D> {
    pub owner: Option<O>,
    pub dependents: Vec<D>,
}

impl<O, D> Dependents<O, D> {
    pub fn is_referenced(&self) -> bool {
        !self.dependents.is_empty()
    }
}

/// Which references of a book do not resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingReferences {
    pub author: Option<AuthorId>,
    pub genres: Vec<GenreId>,
}

impl MissingReferences {
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.genres.is_empty()
    }
}

#[derive(Debug)]
pub struct Resolver<'a, B: StoreBackend> {
    store: &'a DocumentStore<B>,
}

impl<'a, B: StoreBackend> Resolver<'a, B> {
    pub fn new(store: &'a DocumentStore<B>) -> Self {
        Self { store }
    }

    async fn find<D: Document>(&self, id: impl Into<Uuid>) -> CatalogResult<Option<D>> {
        Ok(self.store.typed_collection::<D>().find_by_id(id).await?)
    }

    async fn require<D: Document>(&self, id: impl Into<Uuid>) -> CatalogResult<D> {
        let id = id.into();

        self.find::<D>(id)
            .await?
            .ok_or_else(|| CatalogError::missing::<D>(id))
    }

    /// Every record of `D`, ordered by `field`.
    pub async fn all<D: Document>(&self, field: &str) -> CatalogResult<Vec<D>> {
        let query = Query::builder()
            .sort(field, SortDirection::Asc)
            .build();

        Ok(self.store.typed_collection::<D>().find(query).await?)
    }

    /// Title and summary of every book by `author`.
    pub async fn books_by_author(&self, author: AuthorId) -> CatalogResult<Vec<BookSummary>> {
        let query = Query::builder()
            .filter(Filter::eq("author", author))
            .sort("title", SortDirection::Asc)
            .project(BookSummary::FIELDS)
            .build();

        Ok(self.store.typed_collection::<Book>().find_projected(query).await?)
    }

    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if the author does not exist.
    pub async fn author_with_books(&self, id: AuthorId) -> CatalogResult<AuthorWithBooks> {
        debug!(author = %id, "resolving author with books");

        let (author, books) = try_join!(self.find::<Author>(id), self.books_by_author(id))?;
        let author = author.ok_or_else(|| CatalogError::missing::<Author>(id))?;

        Ok(AuthorWithBooks { author, books })
    }

    pub async fn books_by_genre(&self, genre: GenreId) -> CatalogResult<Vec<Book>> {
        let query = Query::builder()
            .filter(Filter::contains("genre", genre))
            .sort("title", SortDirection::Asc)
            .build();

        Ok(self.store.typed_collection::<Book>().find(query).await?)
    }

    pub async fn genre_with_books(&self, id: GenreId) -> CatalogResult<GenreWithBooks> {
        debug!(genre = %id, "resolving genre with books");

        let (genre, books) = try_join!(self.find::<Genre>(id), self.books_by_genre(id))?;
        let genre = genre.ok_or_else(|| CatalogError::missing::<Genre>(id))?;

        Ok(GenreWithBooks { genre, books })
    }

    pub async fn instances_by_book(&self, book: BookId) -> CatalogResult<Vec<BookInstance>> {
        Ok(
            self.store
                .typed_collection::<BookInstance>()
                .find_by(Filter::eq("book", book))
                .await?
        )
    }

    /// Resolves a book, its copies, its author and its genres.
    ///
    /// Runs as two fan-outs: the book with its instances, then the author
    /// with the genres, since the second needs the references the book holds.
    /// A reference that no longer resolves is left out rather than failing.
    pub async fn book_with_instances(&self, id: BookId) -> CatalogResult<BookWithInstances> {
        debug!(book = %id, "resolving book with instances");

        let (book, instances) = try_join!(self.find::<Book>(id), self.instances_by_book(id))?;
        let book = book.ok_or_else(|| CatalogError::missing::<Book>(id))?;

        let author_ref = book.author;
        let genre_ids = book.genre.clone();
        let author_lookup = async {
            match author_ref {
                Some(author) => self.find::<Author>(author).await,
                None => Ok(None),
            }
        };
        let genre_lookup = async {
            Ok::<_, CatalogError>(
                self.store
                    .typed_collection::<Genre>()
                    .find_by_ids(genre_ids)
                    .await?
            )
        };
        let (author, genres) = try_join!(author_lookup, genre_lookup)?;

        Ok(BookWithInstances { book, author, genres, instances })
    }

    /// Resolves a copy and the book it references. The book may be gone.
    pub async fn instance_with_book(&self, id: BookInstanceId) -> CatalogResult<InstanceWithBook> {
        let instance = self.require::<BookInstance>(id).await?;
        let book = self.find::<Book>(instance.book).await?;

        Ok(InstanceWithBook { instance, book })
    }

    pub async fn author_dependents(&self, id: AuthorId) -> CatalogResult<Dependents<Author, Book>> {
        let books = async {
            Ok::<_, CatalogError>(
                self.store
                    .typed_collection::<Book>()
                    .find_by(Filter::eq("author", id))
                    .await?
            )
        };
        let (owner, dependents) = try_join!(self.find::<Author>(id), books)?;

        Ok(Dependents { owner, dependents })
    }

    pub async fn genre_dependents(&self, id: GenreId) -> CatalogResult<Dependents<Genre, Book>> {
        let (owner, dependents) = try_join!(self.find::<Genre>(id), self.books_by_genre(id))?;

        Ok(Dependents { owner, dependents })
    }

    pub async fn book_dependents(&self, id: BookId) -> CatalogResult<Dependents<Book, BookInstance>> {
        let (owner, dependents) = try_join!(self.find::<Book>(id), self.instances_by_book(id))?;

        Ok(Dependents { owner, dependents })
    }

    /// Checks that a book's author and genres exist, all at once.
    pub async fn missing_references(
        &self,
        author: Option<AuthorId>,
        genres: &[GenreId],
    ) -> CatalogResult<MissingReferences> {
        let author_lookup = async {
            let missing = match author {
                Some(id) => self.find::<Author>(id).await?.is_none().then_some(id),
                None => None,
            };
            Ok::<_, CatalogError>(missing)
        };
        let genre_lookup = async {
            Ok::<_, CatalogError>(
                self.store
                    .typed_collection::<Genre>()
                    .find_by_ids(genres.to_vec())
                    .await?
            )
        };
        let (author, found) = try_join!(author_lookup, genre_lookup)?;

        let genres = genres
            .iter()
            .filter(|id| !found.iter().any(|genre| genre.id == **id))
            .copied()
            .collect();

        Ok(MissingReferences { author, genres })
    }

    pub async fn book_exists(&self, id: BookId) -> CatalogResult<bool> {
        Ok(self.find::<Book>(id).await?.is_some())
    }

    pub async fn instance_exists(&self, id: BookInstanceId) -> CatalogResult<bool> {
        Ok(self.find::<BookInstance>(id).await?.is_some())
    }

    /// Genres whose name is exactly `name`.
    pub async fn genres_named(&self, name: &str) -> CatalogResult<Vec<Genre>> {
        Ok(
            self.store
                .typed_collection::<Genre>()
                .find_by(Filter::eq("name", name))
                .await?
        )
    }
}
