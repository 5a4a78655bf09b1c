//! View-only fields computed from stored state.
//!
//! Everything here is a pure function of a record. Nothing is cached and
//! nothing is written back.

use chrono::{Datelike, NaiveDate};

use crate::{
    error::{CatalogError, CatalogResult},
    model::{Author, BookInstance, Resource},
};

/// `"{family_name}, {first_name}"`, or an empty string unless both are set.
pub fn display_name(author: &Author) -> String {
    if author.first_name.is_empty() || author.family_name.is_empty() {
        return String::new();
    }

    format!("{}, {}", author.family_name, author.first_name)
}

pub fn has_both_dates(author: &Author) -> bool {
    author.date_of_birth.is_some() && author.date_of_death.is_some()
}

/// Difference between the death and birth years.
///
/// # Errors
///
/// [`CatalogError::InvalidState`] if either date is absent. Read paths use
/// [`lifespan`] instead.
pub fn lifespan_years(author: &Author) -> CatalogResult<String> {
    match (author.date_of_birth, author.date_of_death) {
        (Some(born), Some(died)) => Ok((died.year() - born.year()).to_string()),
        _ => Err(CatalogError::InvalidState(format!(
            "author {} does not have both a birth and a death date",
            author.id
        ))),
    }
}

/// [`lifespan_years`] guarded by [`has_both_dates`]; empty when a date is missing.
pub fn lifespan(author: &Author) -> String {
    if !has_both_dates(author) {
        return String::new();
    }

    lifespan_years(author).unwrap_or_default()
}

/// `YYYY-MM-DD`, or an empty string.
pub fn formatted_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Long form of the due date, e.g. `March 07, 2024`.
pub fn due_back_formatted(instance: &BookInstance) -> String {
    instance
        .due_back
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_default()
}

/// `/{route}/{id}`.
pub fn canonical_path<R: Resource>(resource: &R) -> String {
    format!("/{}/{}", R::ROUTE, resource.id())
}

/// `/{list route}`, where deletes redirect to.
pub fn list_path<R: Resource>() -> String {
    format!("/{}", R::LIST_ROUTE)
}
