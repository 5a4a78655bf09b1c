//! Filter evaluation for the in-memory backend.

use std::cmp::Ordering;
use bson::Bson;

use libris_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, FieldOp},
};

/// A borrowed BSON value reduced to what filtering and sorting compare.
///
/// Integers and doubles compare as numbers. Binary values, which is how ids
/// are stored, compare by subtype then bytes. Anything else only compares
/// equal to an identical value and never orders.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Number(f64),
    String(&'a str),
    Binary(u8, &'a [u8]),
    Array(Vec<Comparable<'a>>),
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Int32(value) => Comparable::Number(f64::from(*value)),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Binary(binary) => Comparable::Binary(u8::from(binary.subtype), &binary.bytes),
            Bson::Array(items) => Comparable::Array(items.iter().map(Comparable::from).collect()),
            other => Comparable::Other(other),
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Binary(sa, a), Comparable::Binary(sb, b)) => sa == sb && a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            // Missing values sort first.
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Null, _) => Some(Ordering::Less),
            (_, Comparable::Null) => Some(Ordering::Greater),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::Binary(sa, a), Comparable::Binary(sb, b)) => (sa, a).partial_cmp(&(sb, b)),
            _ => None,
        }
    }
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Bson,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Bson) -> Self {
        Self { document }
    }

    /// Fails if the stored value is not a document.
    pub fn evaluate(&self, expr: &Expr) -> DocumentStoreResult<bool> {
        let Some(field_value) = self.field(&expr.field)? else {
            return Ok(false);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(&expr.value);

        Ok(match expr.op {
            FieldOp::Eq => left == right,
            FieldOp::Contains => match (left, right) {
                (Comparable::Array(items), needle) => items.iter().any(|item| item == &needle),
                (Comparable::String(haystack), Comparable::String(needle)) => haystack.contains(needle),
                _ => false,
            },
        })
    }

    /// Returns clones of the documents matching `expr`.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Bson>,
        expr: &Expr,
    ) -> DocumentStoreResult<Vec<Bson>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).evaluate(expr)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }

    fn field(&self, field: &str) -> DocumentStoreResult<Option<&'a Bson>> {
        match self.document.as_document() {
            Some(doc) => Ok(doc.get(field)),
            None => Err(DocumentStoreError::InvalidDocument(format!(
                "cannot filter on {field}: stored value is {:?}",
                self.document.element_type()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Uuid, doc};
    use libris_core::query::Filter;

    fn eval(document: &Bson, expr: &Expr) -> bool {
        DocumentEvaluator::new(document).evaluate(expr).unwrap()
    }

    #[test]
    fn uuid_equality_distinguishes_ids() {
        let id = Uuid::new();
        let book = Bson::Document(doc! { "author": id });

        assert!(eval(&book, &Filter::eq("author", id)));
        assert!(!eval(&book, &Filter::eq("author", Uuid::new())));
    }

    #[test]
    fn contains_tests_array_membership() {
        let fantasy = Uuid::new();
        let book = Bson::Document(doc! { "genre": [fantasy, Uuid::new()] });

        assert!(eval(&book, &Filter::contains("genre", fantasy)));
        assert!(!eval(&book, &Filter::contains("genre", Uuid::new())));
    }

    #[test]
    fn contains_falls_back_to_substring_on_text() {
        let book = Bson::Document(doc! { "title": "The Name of the Wind" });

        assert!(eval(&book, &Filter::contains("title", "Wind")));
        assert!(!eval(&book, &Filter::contains("title", "Fear")));
    }

    #[test]
    fn missing_field_never_matches() {
        let book = Bson::Document(doc! { "title": "Dune" });

        assert!(!eval(&book, &Filter::eq("author", Uuid::new())));
        assert!(!eval(&book, &Filter::contains("genre", Uuid::new())));
    }

    #[test]
    fn non_document_values_are_rejected() {
        let err = DocumentEvaluator::new(&Bson::Int32(1))
            .evaluate(&Filter::eq("title", "x"))
            .unwrap_err();

        assert!(matches!(err, DocumentStoreError::InvalidDocument(_)));
    }
}
