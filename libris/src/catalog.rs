//! Catalog workflows.
//!
//! [`Catalog`] is what a presentation layer calls. It takes ids as the
//! strings a route delivers and raw [`FormData`], and hands back view records
//! or write outcomes. Reads run store → [`Resolver`] → [`derived`]; writes run
//! [`forms`] → [`Mutator`] → store.
//!
//! A malformed id is treated like an unknown one and yields
//! [`CatalogError::NotFound`].

use std::collections::HashMap;

use futures::try_join;
use libris_core::{backend::StoreBackend, document::Document, store::DocumentStore};
use tracing::debug;

use crate::{
    derived,
    error::{CatalogError, CatalogResult},
    model::{
        Author, AuthorFields, AuthorId, Book, BookFields, BookId, BookInstance, BookInstanceId, Genre, GenreFields,
        GenreId, InstanceFields, Resource,
    },
    mutator::{Checked, Deletion, GenreCreation, Mutator},
    resolver::Resolver,
    validation::{FieldError, FormData, Pipeline, SanitizedForm, Validation, forms},
    view::{
        AuthorDetail, AuthorView, BookChoices, BookDetail, BookForm, BookView, DeleteOutcome, DeletePreview,
        GenreDetail, GenreView, InstanceDetail, InstanceForm, InstanceView, SaveOutcome, views,
    },
};

fn parse_id<D: Document, I>(raw: &str, parse: impl FnOnce(&str) -> Option<I>) -> CatalogResult<I> {
    parse(raw).ok_or_else(|| CatalogError::missing::<D>(raw))
}

fn saved<R: Resource>(resource: &R) -> SaveOutcome {
    SaveOutcome::Saved { path: derived::canonical_path(resource) }
}

fn rejected(errors: Vec<FieldError>, form: SanitizedForm) -> SaveOutcome {
    debug!(errors = errors.len(), "submission rejected");
    SaveOutcome::Invalid { errors, form }
}

/// Runs `pipeline`, or produces the outcome that re-renders the form.
fn validate(pipeline: Pipeline, form: &FormData) -> Result<SanitizedForm, SaveOutcome> {
    match pipeline.validate(form) {
        Validation::Valid(clean) => Ok(clean),
        Validation::Invalid { errors, partial } => Err(rejected(errors, partial)),
    }
}

fn deleted<R: Resource, D, V>(deletion: Deletion<D>) -> DeleteOutcome<V>
where
    V: for<'a> From<&'a D>,
{
    match deletion {
        Deletion::Deleted => DeleteOutcome::Deleted { path: derived::list_path::<R>() },
        Deletion::Blocked(dependents) => DeleteOutcome::Blocked { dependents: views(&dependents) },
    }
}

#[derive(Debug)]
pub struct Catalog<B: StoreBackend> {
    store: DocumentStore<B>,
}

impl<B: StoreBackend> Catalog<B> {
    pub fn new(store: DocumentStore<B>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore<B> {
        &self.store
    }

    pub fn into_store(self) -> DocumentStore<B> {
        self.store
    }

    pub fn resolver(&self) -> Resolver<'_, B> {
        Resolver::new(&self.store)
    }

    pub fn mutator(&self) -> Mutator<'_, B> {
        Mutator::new(&self.store)
    }

    // Authors

    /// Every author, ordered by family name.
    pub async fn list_authors(&self) -> CatalogResult<Vec<AuthorView>> {
        let authors = self.resolver().all::<Author>("family_name").await?;
        Ok(views(&authors))
    }

    pub async fn author_detail(&self, id: &str) -> CatalogResult<AuthorDetail> {
        let id = parse_id::<Author, _>(id, AuthorId::parse)?;
        let resolved = self.resolver().author_with_books(id).await?;

        Ok(AuthorDetail {
            author: AuthorView::from(&resolved.author),
            books: resolved.books,
        })
    }

    pub async fn create_author(&self, form: &FormData) -> CatalogResult<SaveOutcome> {
        let clean = match validate(forms::author(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        let author = self.mutator().create_author(AuthorFields::try_from(&clean)?).await?;
        Ok(saved(&author))
    }

    /// The author to prefill the update form with.
    pub async fn author_form(&self, id: &str) -> CatalogResult<AuthorView> {
        let id = parse_id::<Author, _>(id, AuthorId::parse)?;
        let author = self.require::<Author>(id).await?;

        Ok(AuthorView::from(&author))
    }

    pub async fn update_author(&self, id: &str, form: &FormData) -> CatalogResult<SaveOutcome> {
        let id = parse_id::<Author, _>(id, AuthorId::parse)?;
        let clean = match validate(forms::author(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        let author = self.mutator().update_author(id, AuthorFields::try_from(&clean)?).await?;
        Ok(saved(&author))
    }

    /// The author and the books that would block its deletion, or `None`
    /// when the author is already gone (callers redirect to the list).
    pub async fn author_delete_preview(&self, id: &str) -> CatalogResult<Option<DeletePreview<AuthorView, BookView>>> {
        let id = parse_id::<Author, _>(id, AuthorId::parse)?;
        let resolved = self.resolver().author_dependents(id).await?;

        Ok(resolved.owner.map(|author| DeletePreview {
            owner: AuthorView::from(&author),
            dependents: views(&resolved.dependents),
        }))
    }

    pub async fn delete_author(&self, id: &str) -> CatalogResult<DeleteOutcome<BookView>> {
        let id = parse_id::<Author, _>(id, AuthorId::parse)?;
        let deletion = self.mutator().delete_author(id).await?;

        Ok(deleted::<Author, _, _>(deletion))
    }

    // Genres

    /// Every genre, ordered by name.
    pub async fn list_genres(&self) -> CatalogResult<Vec<GenreView>> {
        let genres = self.resolver().all::<Genre>("name").await?;
        Ok(views(&genres))
    }

    pub async fn genre_detail(&self, id: &str) -> CatalogResult<GenreDetail> {
        let id = parse_id::<Genre, _>(id, GenreId::parse)?;
        let resolved = self.resolver().genre_with_books(id).await?;

        Ok(GenreDetail {
            genre: GenreView::from(&resolved.genre),
            books: views(&resolved.books),
        })
    }

    /// Creates a genre. When the name is taken, the outcome points at the
    /// existing genre instead.
    pub async fn create_genre(&self, form: &FormData) -> CatalogResult<SaveOutcome> {
        let clean = match validate(forms::genre(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        let created = self.mutator().create_genre(GenreFields::try_from(&clean)?).await?;
        if let GenreCreation::Existing(genre) = &created {
            debug!(genre = %genre.id, "redirecting to existing genre");
        }

        Ok(saved(created.genre()))
    }

    pub async fn genre_form(&self, id: &str) -> CatalogResult<GenreView> {
        let id = parse_id::<Genre, _>(id, GenreId::parse)?;
        let genre = self.require::<Genre>(id).await?;

        Ok(GenreView::from(&genre))
    }

    pub async fn update_genre(&self, id: &str, form: &FormData) -> CatalogResult<SaveOutcome> {
        let id = parse_id::<Genre, _>(id, GenreId::parse)?;
        let clean = match validate(forms::genre(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        let genre = self.mutator().update_genre(id, GenreFields::try_from(&clean)?).await?;
        Ok(saved(&genre))
    }

    pub async fn genre_delete_preview(&self, id: &str) -> CatalogResult<Option<DeletePreview<GenreView, BookView>>> {
        let id = parse_id::<Genre, _>(id, GenreId::parse)?;
        let resolved = self.resolver().genre_dependents(id).await?;

        Ok(resolved.owner.map(|genre| DeletePreview {
            owner: GenreView::from(&genre),
            dependents: views(&resolved.dependents),
        }))
    }

    pub async fn delete_genre(&self, id: &str) -> CatalogResult<DeleteOutcome<BookView>> {
        let id = parse_id::<Genre, _>(id, GenreId::parse)?;
        let deletion = self.mutator().delete_genre(id).await?;

        Ok(deleted::<Genre, _, _>(deletion))
    }

    // Books

    /// Every book, ordered by title.
    pub async fn list_books(&self) -> CatalogResult<Vec<BookView>> {
        let books = self.resolver().all::<Book>("title").await?;
        Ok(views(&books))
    }

    pub async fn book_detail(&self, id: &str) -> CatalogResult<BookDetail> {
        let id = parse_id::<Book, _>(id, BookId::parse)?;
        let resolved = self.resolver().book_with_instances(id).await?;

        Ok(BookDetail {
            book: BookView::from(&resolved.book),
            author: resolved.author.as_ref().map(AuthorView::from),
            genres: views(&resolved.genres),
            instances: views(&resolved.instances),
        })
    }

    /// Authors and genres a book may reference.
    pub async fn book_choices(&self) -> CatalogResult<BookChoices> {
        let resolver = self.resolver();
        let (authors, genres) = try_join!(
            resolver.all::<Author>("family_name"),
            resolver.all::<Genre>("name"),
        )?;

        Ok(BookChoices {
            authors: views(&authors),
            genres: views(&genres),
        })
    }

    pub async fn create_book(&self, form: &FormData) -> CatalogResult<SaveOutcome> {
        let clean = match validate(forms::book(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        match self.mutator().create_book(BookFields::try_from(&clean)?).await? {
            Checked::Accepted(book) => Ok(saved(&book)),
            Checked::Rejected(errors) => Ok(rejected(errors, clean)),
        }
    }

    pub async fn book_form(&self, id: &str) -> CatalogResult<BookForm> {
        let id = parse_id::<Book, _>(id, BookId::parse)?;
        let (book, choices) = try_join!(self.require::<Book>(id), self.book_choices())?;

        Ok(BookForm { book: BookView::from(&book), choices })
    }

    pub async fn update_book(&self, id: &str, form: &FormData) -> CatalogResult<SaveOutcome> {
        let id = parse_id::<Book, _>(id, BookId::parse)?;
        let clean = match validate(forms::book(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        match self.mutator().update_book(id, BookFields::try_from(&clean)?).await? {
            Checked::Accepted(book) => Ok(saved(&book)),
            Checked::Rejected(errors) => Ok(rejected(errors, clean)),
        }
    }

    pub async fn book_delete_preview(&self, id: &str) -> CatalogResult<Option<DeletePreview<BookView, InstanceView>>> {
        let id = parse_id::<Book, _>(id, BookId::parse)?;
        let resolved = self.resolver().book_dependents(id).await?;

        Ok(resolved.owner.map(|book| DeletePreview {
            owner: BookView::from(&book),
            dependents: views(&resolved.dependents),
        }))
    }

    pub async fn delete_book(&self, id: &str) -> CatalogResult<DeleteOutcome<InstanceView>> {
        let id = parse_id::<Book, _>(id, BookId::parse)?;
        let deletion = self.mutator().delete_book(id).await?;

        Ok(deleted::<Book, _, _>(deletion))
    }

    // Book instances

    /// Every copy together with the book it references.
    pub async fn list_instances(&self) -> CatalogResult<Vec<InstanceDetail>> {
        let resolver = self.resolver();
        let (instances, books) = try_join!(
            resolver.all::<BookInstance>("imprint"),
            resolver.all::<Book>("title"),
        )?;

        let books = books
            .iter()
            .map(|book| (book.id, book))
            .collect::<HashMap<_, _>>();

        Ok(
            instances
                .iter()
                .map(|instance| InstanceDetail {
                    instance: InstanceView::from(instance),
                    book: books.get(&instance.book).map(|book| BookView::from(*book)),
                })
                .collect()
        )
    }

    pub async fn instance_detail(&self, id: &str) -> CatalogResult<InstanceDetail> {
        let id = parse_id::<BookInstance, _>(id, BookInstanceId::parse)?;
        let resolved = self.resolver().instance_with_book(id).await?;

        Ok(InstanceDetail {
            instance: InstanceView::from(&resolved.instance),
            book: resolved.book.as_ref().map(BookView::from),
        })
    }

    /// Books a copy may reference.
    pub async fn instance_choices(&self) -> CatalogResult<Vec<BookView>> {
        self.list_books().await
    }

    pub async fn create_instance(&self, form: &FormData) -> CatalogResult<SaveOutcome> {
        let clean = match validate(forms::instance(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        match self.mutator().create_instance(InstanceFields::try_from(&clean)?).await? {
            Checked::Accepted(instance) => Ok(saved(&instance)),
            Checked::Rejected(errors) => Ok(rejected(errors, clean)),
        }
    }

    pub async fn instance_form(&self, id: &str) -> CatalogResult<InstanceForm> {
        let id = parse_id::<BookInstance, _>(id, BookInstanceId::parse)?;
        let (instance, books) = try_join!(self.require::<BookInstance>(id), self.instance_choices())?;

        Ok(InstanceForm { instance: InstanceView::from(&instance), books })
    }

    pub async fn update_instance(&self, id: &str, form: &FormData) -> CatalogResult<SaveOutcome> {
        let id = parse_id::<BookInstance, _>(id, BookInstanceId::parse)?;
        let clean = match validate(forms::instance(), form) {
            Ok(clean) => clean,
            Err(outcome) => return Ok(outcome),
        };

        match self.mutator().update_instance(id, InstanceFields::try_from(&clean)?).await? {
            Checked::Accepted(instance) => Ok(saved(&instance)),
            Checked::Rejected(errors) => Ok(rejected(errors, clean)),
        }
    }

    /// The copy to confirm deletion of, or `None` when it is already gone.
    pub async fn instance_delete_preview(&self, id: &str) -> CatalogResult<Option<InstanceView>> {
        let id = parse_id::<BookInstance, _>(id, BookInstanceId::parse)?;
        let instance = self
            .store
            .typed_collection::<BookInstance>()
            .find_by_id(id)
            .await?;

        Ok(instance.as_ref().map(InstanceView::from))
    }

    /// Deletes a copy. Never blocked.
    pub async fn delete_instance(&self, id: &str) -> CatalogResult<DeleteOutcome<InstanceView>> {
        let id = parse_id::<BookInstance, _>(id, BookInstanceId::parse)?;
        self.mutator().delete_instance(id).await?;

        Ok(DeleteOutcome::Deleted { path: derived::list_path::<BookInstance>() })
    }

    async fn require<D: Document>(&self, id: impl Into<bson::Uuid>) -> CatalogResult<D> {
        let id = id.into();

        self.store
            .typed_collection::<D>()
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::missing::<D>(id))
    }
}
