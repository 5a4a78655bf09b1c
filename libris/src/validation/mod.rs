//! Declarative validation and sanitization of submitted form data.
//!
//! A [`Pipeline`] is an ordered list of [`FieldRule`]s. Every rule runs
//! against the whole submission and every failure is collected, so one
//! submission reports all of its problems at once. Validation is a pure
//! function: [`Pipeline::validate`] takes the raw form and returns either the
//! sanitized values or the errors together with whatever could be sanitized.
//!
//! ```ignore
//! match forms::author().validate(&form) {
//!     Validation::Valid(clean) => mutator.create_author(AuthorFields::try_from(&clean)?).await?,
//!     Validation::Invalid { errors, partial } => redisplay(errors, partial),
//! }
//! ```

pub mod forms;
mod rules;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use rules::{Check, FieldRule, Presence, Sanitizer};

/// Raw submitted values. A field may be submitted more than once (checkbox groups).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FormData::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Appends a value for `field`.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(value.into());
    }

    /// The first value submitted for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.get_all(field).first().map(String::as_str)
    }

    pub fn get_all(&self, field: &str) -> &[String] {
        self.fields
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A sanitized value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    List(Vec<String>),
}

/// The output of a pipeline: sanitized values keyed by field name.
///
/// Optional fields submitted empty are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SanitizedForm {
    values: BTreeMap<String, FieldValue>,
}

impl SanitizedForm {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(FieldValue::Date(date)) => Some(*date),
            _ => None,
        }
    }

    pub fn list(&self, field: &str) -> &[String] {
        match self.values.get(field) {
            Some(FieldValue::List(values)) => values,
            _ => &[],
        }
    }

    pub(crate) fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }
}

/// One failed check on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    /// Machine-readable kind of failure, e.g. `required` or `length`.
    pub code: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(SanitizedForm),
    Invalid {
        errors: Vec<FieldError>,
        partial: SanitizedForm,
    },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    rules: Vec<FieldRule>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Runs every rule, in order, against `form`.
    pub fn validate(&self, form: &FormData) -> Validation {
        let mut sanitized = SanitizedForm::default();
        let mut errors = Vec::new();

        for rule in &self.rules {
            rule.apply(form, &mut sanitized, &mut errors);
        }

        if errors.is_empty() {
            Validation::Valid(sanitized)
        } else {
            Validation::Invalid { errors, partial: sanitized }
        }
    }
}
