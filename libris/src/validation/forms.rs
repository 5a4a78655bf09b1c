//! The four entity forms and their conversion into writable fields.

use crate::{
    error::CatalogError,
    model::{AuthorFields, AuthorId, BookFields, BookId, GenreFields, GenreId, InstanceFields, InstanceStatus},
};

use super::{Check, FieldRule, Pipeline, SanitizedForm, Sanitizer};

pub fn author() -> Pipeline {
    Pipeline::new()
        .rule(
            FieldRule::required("first_name", "First name must be specified.")
                .check(Check::length(1, 100, "First name must be at most 100 characters."))
                .check(Check::alphanumeric("First name has non-alphanumeric characters."))
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::Escape),
        )
        .rule(
            FieldRule::required("family_name", "Family name must be specified.")
                .check(Check::length(1, 100, "Family name must be at most 100 characters."))
                .check(Check::alphanumeric("Family name has non-alphanumeric characters."))
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::Escape),
        )
        .rule(
            FieldRule::optional("date_of_birth")
                .check(Check::iso_date("Invalid date of birth"))
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::ToDate),
        )
        .rule(
            FieldRule::optional("date_of_death")
                .check(Check::iso_date("Invalid date of death"))
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::ToDate),
        )
}

pub fn genre() -> Pipeline {
    Pipeline::new().rule(
        FieldRule::required("name", "Genre name required.")
            .check(Check::length(3, 100, "Genre name must be between 3 and 100 characters."))
            .sanitize(Sanitizer::Trim)
            .sanitize(Sanitizer::Escape),
    )
}

pub fn book() -> Pipeline {
    Pipeline::new()
        .rule(
            FieldRule::required("title", "Title must not be empty.")
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::Escape),
        )
        .rule(
            FieldRule::required("summary", "Summary must not be empty.")
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::Escape),
        )
        .rule(
            FieldRule::optional("author")
                .check(Check::reference("Author must be a valid reference."))
                .sanitize(Sanitizer::Trim),
        )
        .rule(
            FieldRule::repeated("genre")
                .check(Check::reference("Genre must be a valid reference."))
                .sanitize(Sanitizer::Trim),
        )
}

pub fn instance() -> Pipeline {
    Pipeline::new()
        .rule(
            FieldRule::required("book", "Book must be specified.")
                .check(Check::reference("Book must be a valid reference."))
                .sanitize(Sanitizer::Trim),
        )
        .rule(
            FieldRule::required("imprint", "Imprint must be specified.")
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::Escape),
        )
        .rule(
            FieldRule::optional("status")
                .check(Check::one_of(InstanceStatus::NAMES, "Invalid status."))
                .sanitize(Sanitizer::Trim),
        )
        .rule(
            FieldRule::optional("due_back")
                .check(Check::iso_date("Invalid date"))
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::ToDate),
        )
}

fn required_text(form: &SanitizedForm, field: &str) -> Result<String, CatalogError> {
    form.text(field)
        .map(str::to_string)
        .ok_or_else(|| CatalogError::InvalidState(format!("sanitized form has no {field}")))
}

/// Parses genre ids, dropping repeats and keeping first-submitted order.
fn genre_set(values: &[String]) -> Vec<GenreId> {
    let mut genres = Vec::with_capacity(values.len());

    for id in values.iter().filter_map(|value| GenreId::parse(value)) {
        if !genres.contains(&id) {
            genres.push(id);
        }
    }

    genres
}

impl TryFrom<&SanitizedForm> for AuthorFields {
    type Error = CatalogError;

    fn try_from(form: &SanitizedForm) -> Result<Self, Self::Error> {
        Ok(AuthorFields {
            first_name: required_text(form, "first_name")?,
            family_name: required_text(form, "family_name")?,
            date_of_birth: form.date("date_of_birth"),
            date_of_death: form.date("date_of_death"),
        })
    }
}

impl TryFrom<&SanitizedForm> for GenreFields {
    type Error = CatalogError;

    fn try_from(form: &SanitizedForm) -> Result<Self, Self::Error> {
        Ok(GenreFields { name: required_text(form, "name")? })
    }
}

impl TryFrom<&SanitizedForm> for BookFields {
    type Error = CatalogError;

    fn try_from(form: &SanitizedForm) -> Result<Self, Self::Error> {
        Ok(BookFields {
            title: required_text(form, "title")?,
            summary: required_text(form, "summary")?,
            author: form.text("author").and_then(AuthorId::parse),
            genre: genre_set(form.list("genre")),
        })
    }
}

impl TryFrom<&SanitizedForm> for InstanceFields {
    type Error = CatalogError;

    fn try_from(form: &SanitizedForm) -> Result<Self, Self::Error> {
        let book = required_text(form, "book")?;
        let book = BookId::parse(&book)
            .ok_or_else(|| CatalogError::InvalidState(format!("{book} is not a book id")))?;
        let status = match form.text("status") {
            Some(status) => status.parse::<InstanceStatus>().map_err(CatalogError::InvalidState)?,
            None => InstanceStatus::default(),
        };

        Ok(InstanceFields {
            book,
            imprint: required_text(form, "imprint")?,
            status,
            due_back: form.date("due_back"),
        })
    }
}
