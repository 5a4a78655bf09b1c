//! Integrity-guarded writes.
//!
//! The store enforces no references, so every write that could break one
//! goes through here. Deletes of referenced kinds (authors, genres, books)
//! first resolve their dependents and refuse while any exist. Creates and
//! updates of referencing kinds (books, instances) first check that what they
//! point at exists.
//!
//! Check and write are separate store calls and nothing is locked between
//! them: a book created for an author after that author's dependency check
//! but before its delete will dangle. That window is accepted.

use bson::Uuid;
use futures::try_join;
use libris_core::{
    backend::StoreBackend,
    document::{Document, fields_to_document},
    store::DocumentStore,
};
use tracing::{debug, info, warn};

use crate::{
    error::{CatalogError, CatalogResult},
    model::{
        Author, AuthorFields, AuthorId, Book, BookFields, BookId, BookInstance, BookInstanceId, Genre,
        GenreFields, GenreId, InstanceFields,
    },
    resolver::{Dependents, MissingReferences, Resolver},
    validation::FieldError,
};

/// Result of a guarded delete.
#[derive(Debug, Clone, PartialEq)]
pub enum Deletion<D> {
    /// The record is gone, whether or not it existed beforehand.
    Deleted,
    /// The record is untouched because these records still reference it.
    Blocked(Vec<D>),
}

/// Result of a reference-checked create or update.
#[derive(Debug, Clone, PartialEq)]
pub enum Checked<T> {
    Accepted(T),
    /// A reference did not resolve. One error per offending field.
    Rejected(Vec<FieldError>),
}

/// Result of creating a genre, which is unique by name.
#[derive(Debug, Clone, PartialEq)]
pub enum GenreCreation {
    Created(Genre),
    /// A genre with this name already existed and nothing was written.
    Existing(Genre),
}

impl GenreCreation {
    pub fn genre(&self) -> &Genre {
        match self {
            GenreCreation::Created(genre) | GenreCreation::Existing(genre) => genre,
        }
    }
}

#[derive(Debug)]
pub struct Mutator<'a, B: StoreBackend> {
    store: &'a DocumentStore<B>,
    resolver: Resolver<'a, B>,
}

impl<'a, B: StoreBackend> Mutator<'a, B> {
    pub fn new(store: &'a DocumentStore<B>) -> Self {
        Self { store, resolver: Resolver::new(store) }
    }

    pub async fn create_author(&self, fields: AuthorFields) -> CatalogResult<Author> {
        let author = fields.into_author(AuthorId::generate());
        self.store.typed_collection::<Author>().insert(author.clone()).await?;

        info!(author = %author.id, "author created");
        Ok(author)
    }

    /// Overwrites the author's fields.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if the author does not exist.
    pub async fn update_author(&self, id: AuthorId, fields: AuthorFields) -> CatalogResult<Author> {
        let author = self
            .store
            .typed_collection::<Author>()
            .update_by_id(id, fields_to_document(&fields)?)
            .await?;

        info!(author = %id, "author updated");
        Ok(author)
    }

    /// Deletes an author that no book references.
    ///
    /// Deleting an author that does not exist succeeds without writing.
    pub async fn delete_author(&self, id: AuthorId) -> CatalogResult<Deletion<Book>> {
        let Dependents { owner, dependents } = self.resolver.author_dependents(id).await?;

        if owner.is_none() {
            debug!(author = %id, "author already absent");
            return Ok(Deletion::Deleted);
        }

        if !dependents.is_empty() {
            warn!(author = %id, books = dependents.len(), "author delete blocked");
            return Ok(Deletion::Blocked(dependents));
        }

        self.delete::<Author>(id).await?;

        info!(author = %id, "author deleted");
        Ok(Deletion::Deleted)
    }

    /// Creates a genre unless one with the same name exists.
    pub async fn create_genre(&self, fields: GenreFields) -> CatalogResult<GenreCreation> {
        if let Some(existing) = self.resolver.genres_named(&fields.name).await?.into_iter().next() {
            debug!(genre = %existing.id, "genre name already taken");
            return Ok(GenreCreation::Existing(existing));
        }

        let genre = fields.into_genre(GenreId::generate());
        self.store.typed_collection::<Genre>().insert(genre.clone()).await?;

        info!(genre = %genre.id, "genre created");
        Ok(GenreCreation::Created(genre))
    }

    pub async fn update_genre(&self, id: GenreId, fields: GenreFields) -> CatalogResult<Genre> {
        let genre = self
            .store
            .typed_collection::<Genre>()
            .update_by_id(id, fields_to_document(&fields)?)
            .await?;

        info!(genre = %id, "genre updated");
        Ok(genre)
    }

    /// Deletes a genre that no book is filed under.
    pub async fn delete_genre(&self, id: GenreId) -> CatalogResult<Deletion<Book>> {
        let Dependents { owner, dependents } = self.resolver.genre_dependents(id).await?;

        if owner.is_none() {
            return Ok(Deletion::Deleted);
        }

        if !dependents.is_empty() {
            warn!(genre = %id, books = dependents.len(), "genre delete blocked");
            return Ok(Deletion::Blocked(dependents));
        }

        self.delete::<Genre>(id).await?;

        info!(genre = %id, "genre deleted");
        Ok(Deletion::Deleted)
    }

    pub async fn create_book(&self, fields: BookFields) -> CatalogResult<Checked<Book>> {
        let missing = self.resolver.missing_references(fields.author, &fields.genre).await?;

        if !missing.is_empty() {
            return Ok(Checked::Rejected(reference_errors(&missing)));
        }

        let book = fields.into_book(BookId::generate());
        self.store.typed_collection::<Book>().insert(book.clone()).await?;

        info!(book = %book.id, "book created");
        Ok(Checked::Accepted(book))
    }

    /// Overwrites a book's fields after checking its new references.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if the book does not exist, checked ahead
    /// of the references.
    pub async fn update_book(&self, id: BookId, fields: BookFields) -> CatalogResult<Checked<Book>> {
        let (exists, missing) = try_join!(
            self.resolver.book_exists(id),
            self.resolver.missing_references(fields.author, &fields.genre),
        )?;

        if !exists {
            return Err(CatalogError::missing::<Book>(id));
        }

        if !missing.is_empty() {
            return Ok(Checked::Rejected(reference_errors(&missing)));
        }

        let book = self
            .store
            .typed_collection::<Book>()
            .update_by_id(id, fields_to_document(&fields)?)
            .await?;

        info!(book = %id, "book updated");
        Ok(Checked::Accepted(book))
    }

    /// Deletes a book that has no copies.
    pub async fn delete_book(&self, id: BookId) -> CatalogResult<Deletion<BookInstance>> {
        let Dependents { owner, dependents } = self.resolver.book_dependents(id).await?;

        if owner.is_none() {
            return Ok(Deletion::Deleted);
        }

        if !dependents.is_empty() {
            warn!(book = %id, instances = dependents.len(), "book delete blocked");
            return Ok(Deletion::Blocked(dependents));
        }

        self.delete::<Book>(id).await?;

        info!(book = %id, "book deleted");
        Ok(Deletion::Deleted)
    }

    pub async fn create_instance(&self, fields: InstanceFields) -> CatalogResult<Checked<BookInstance>> {
        if !self.resolver.book_exists(fields.book).await? {
            return Ok(Checked::Rejected(vec![unknown_book()]));
        }

        let instance = fields.into_instance(BookInstanceId::generate());
        self.store.typed_collection::<BookInstance>().insert(instance.clone()).await?;

        info!(instance = %instance.id, book = %instance.book, "book instance created");
        Ok(Checked::Accepted(instance))
    }

    /// Overwrites a copy's fields after checking the book it points at.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if the copy does not exist, whatever its
    /// new book reference.
    pub async fn update_instance(
        &self,
        id: BookInstanceId,
        fields: InstanceFields,
    ) -> CatalogResult<Checked<BookInstance>> {
        let (exists, book_exists) = try_join!(
            self.resolver.instance_exists(id),
            self.resolver.book_exists(fields.book),
        )?;

        if !exists {
            return Err(CatalogError::missing::<BookInstance>(id));
        }

        if !book_exists {
            return Ok(Checked::Rejected(vec![unknown_book()]));
        }

        let instance = self
            .store
            .typed_collection::<BookInstance>()
            .update_by_id(id, fields_to_document(&fields)?)
            .await?;

        info!(instance = %id, "book instance updated");
        Ok(Checked::Accepted(instance))
    }

    /// Deletes a copy. Nothing references copies, so there is no guard.
    pub async fn delete_instance(&self, id: BookInstanceId) -> CatalogResult<()> {
        self.delete::<BookInstance>(id).await?;

        info!(instance = %id, "book instance deleted");
        Ok(())
    }

    /// Deletes by id, treating a record that vanished since the check as deleted.
    async fn delete<D: Document>(&self, id: impl Into<Uuid>) -> CatalogResult<()> {
        match self.store.typed_collection::<D>().delete_by_id(id).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!(collection = D::collection_name(), "record vanished before delete");
                Ok(())
            }
            Err(err) => Err(CatalogError::from(err)),
        }
    }
}

fn reference_errors(missing: &MissingReferences) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Some(author) = missing.author {
        errors.push(FieldError::new("author", format!("Author {author} does not exist."), "not_found"));
    }

    for genre in &missing.genres {
        errors.push(FieldError::new("genre", format!("Genre {genre} does not exist."), "not_found"));
    }

    errors
}

fn unknown_book() -> FieldError {
    FieldError::new("book", "Book does not exist.", "not_found")
}
