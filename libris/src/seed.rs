//! Loads a catalog from a JSON seed file.
//!
//! Seed records go through the same validation pipelines and guarded
//! creates as submitted forms, so a seed cannot put anything into the store
//! that a user could not.
//!
//! ```json
//! {
//!   "genres": ["Fantasy"],
//!   "authors": [{
//!     "first_name": "Ursula", "family_name": "LeGuin", "date_of_birth": "1929-10-21",
//!     "books": [{
//!       "title": "A Wizard of Earthsea", "summary": "...", "genres": ["Fantasy"],
//!       "instances": [{ "imprint": "Parnassus, 1968", "status": "Available" }]
//!     }]
//!   }]
//! }
//! ```

use std::{collections::HashMap, path::Path};

use libris_core::backend::StoreBackend;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    catalog::Catalog,
    error::CatalogError,
    model::{AuthorFields, BookFields, GenreFields, GenreId, InstanceFields},
    mutator::Checked,
    validation::{FieldError, FormData, Pipeline, SanitizedForm, Validation, forms},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub authors: Vec<SeedAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAuthor {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    #[serde(default)]
    pub books: Vec<SeedBook>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedBook {
    pub title: String,
    pub summary: String,
    /// Genre names, resolved against the seeded genres.
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub instances: Vec<SeedInstance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedInstance {
    pub imprint: String,
    pub status: Option<String>,
    pub due_back: Option<String>,
}

/// Counts of records written by a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub genres: usize,
    pub authors: usize,
    pub books: usize,
    pub instances: usize,
}

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Seed {entity} {name:?} was rejected: {}", describe(.errors))]
    Rejected {
        entity: &'static str,
        name: String,
        errors: Vec<FieldError>,
    },
    #[error("Seed book {book:?} names unknown genre {genre:?}")]
    UnknownGenre { book: String, genre: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn load_seed_file<B: StoreBackend>(
    catalog: &Catalog<B>,
    path: impl AsRef<Path>,
) -> Result<SeedReport, SeedError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading seed file");

    let data = serde_json::from_str::<SeedData>(&tokio::fs::read_to_string(path).await?)?;
    apply_seed(catalog, data).await
}

fn clean(pipeline: Pipeline, form: &FormData, entity: &'static str, name: &str) -> Result<SanitizedForm, SeedError> {
    match pipeline.validate(form) {
        Validation::Valid(clean) => Ok(clean),
        Validation::Invalid { errors, .. } => Err(SeedError::Rejected { entity, name: name.to_string(), errors }),
    }
}

fn with_optional(form: FormData, field: &str, value: Option<&str>) -> FormData {
    match value {
        Some(value) => form.with(field, value),
        None => form,
    }
}

/// Writes `data` into the catalog, genres first.
pub async fn apply_seed<B: StoreBackend>(catalog: &Catalog<B>, data: SeedData) -> Result<SeedReport, SeedError> {
    let mutator = catalog.mutator();
    let mut report = SeedReport::default();
    let mut genres = HashMap::<String, GenreId>::new();

    for name in &data.genres {
        let form = FormData::new().with("name", name.as_str());
        let fields = GenreFields::try_from(&clean(forms::genre(), &form, "genre", name)?)?;
        let genre = mutator.create_genre(fields).await?.genre().clone();

        genres.insert(name.clone(), genre.id);
        report.genres += 1;
    }

    for seed_author in &data.authors {
        let form = FormData::new()
            .with("first_name", seed_author.first_name.as_str())
            .with("family_name", seed_author.family_name.as_str());
        let form = with_optional(form, "date_of_birth", seed_author.date_of_birth.as_deref());
        let form = with_optional(form, "date_of_death", seed_author.date_of_death.as_deref());

        let name = format!("{} {}", seed_author.first_name, seed_author.family_name);
        let fields = AuthorFields::try_from(&clean(forms::author(), &form, "author", &name)?)?;
        let author = mutator.create_author(fields).await?;
        report.authors += 1;

        for seed_book in &seed_author.books {
            let mut form = FormData::new()
                .with("title", seed_book.title.as_str())
                .with("summary", seed_book.summary.as_str())
                .with("author", author.id.to_string());

            for genre in &seed_book.genres {
                let id = genres.get(genre).ok_or_else(|| SeedError::UnknownGenre {
                    book: seed_book.title.clone(),
                    genre: genre.clone(),
                })?;
                form.insert("genre", id.to_string());
            }

            let fields = BookFields::try_from(&clean(forms::book(), &form, "book", &seed_book.title)?)?;
            let book = match mutator.create_book(fields).await? {
                Checked::Accepted(book) => book,
                Checked::Rejected(errors) => {
                    return Err(SeedError::Rejected { entity: "book", name: seed_book.title.clone(), errors });
                }
            };
            report.books += 1;

            for seed_instance in &seed_book.instances {
                let form = FormData::new()
                    .with("book", book.id.to_string())
                    .with("imprint", seed_instance.imprint.as_str());
                let form = with_optional(form, "status", seed_instance.status.as_deref());
                let form = with_optional(form, "due_back", seed_instance.due_back.as_deref());

                let fields = InstanceFields::try_from(&clean(forms::instance(), &form, "instance", &seed_instance.imprint)?)?;
                match mutator.create_instance(fields).await? {
                    Checked::Accepted(_) => report.instances += 1,
                    Checked::Rejected(errors) => {
                        return Err(SeedError::Rejected {
                            entity: "instance",
                            name: seed_instance.imprint.clone(),
                            errors,
                        });
                    }
                }
            }
        }
    }

    info!(
        genres = report.genres,
        authors = report.authors,
        books = report.books,
        instances = report.instances,
        "seed applied"
    );
    Ok(report)
}
