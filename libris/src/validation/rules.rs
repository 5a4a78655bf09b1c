use bson::Uuid;
use chrono::{DateTime, NaiveDate};

use super::{FieldError, FieldValue, FormData, SanitizedForm};

#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// An empty or missing value fails with this message and no further
    /// checks run for the field.
    Required { message: String },
    /// An empty or missing value is absent from the output.
    Optional,
}

/// A format constraint on a single non-empty value.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Length in characters, both bounds inclusive.
    ///
    /// Counts the trimmed value as submitted. Escaping runs afterwards, so a
    /// stored value may exceed `max` once entities are substituted.
    Length { min: usize, max: usize, message: String },
    /// ASCII letters and digits only.
    Alphanumeric { message: String },
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    IsoDate { message: String },
    OneOf { allowed: &'static [&'static str], message: String },
    /// A well-formed record id. Whether the record exists is checked later.
    Reference { message: String },
}

impl Check {
    pub fn length(min: usize, max: usize, message: impl Into<String>) -> Self {
        Check::Length { min, max, message: message.into() }
    }

    pub fn alphanumeric(message: impl Into<String>) -> Self {
        Check::Alphanumeric { message: message.into() }
    }

    pub fn iso_date(message: impl Into<String>) -> Self {
        Check::IsoDate { message: message.into() }
    }

    pub fn one_of(allowed: &'static [&'static str], message: impl Into<String>) -> Self {
        Check::OneOf { allowed, message: message.into() }
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Check::Reference { message: message.into() }
    }

    fn passes(&self, value: &str) -> bool {
        match self {
            Check::Length { min, max, .. } => {
                let len = value.chars().count();
                len >= *min && len <= *max
            }
            Check::Alphanumeric { .. } => value.chars().all(|c| c.is_ascii_alphanumeric()),
            Check::IsoDate { .. } => parse_iso_date(value).is_some(),
            Check::OneOf { allowed, .. } => allowed.contains(&value),
            Check::Reference { .. } => Uuid::parse_str(value).is_ok(),
        }
    }

    fn error(&self, field: &str) -> FieldError {
        let (message, code) = match self {
            Check::Length { message, .. } => (message, "length"),
            Check::Alphanumeric { message } => (message, "alphanumeric"),
            Check::IsoDate { message } => (message, "date"),
            Check::OneOf { message, .. } => (message, "one_of"),
            Check::Reference { message } => (message, "reference"),
        };

        FieldError::new(field, message.as_str(), code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// Strip surrounding whitespace. Always runs before the checks.
    Trim,
    /// Replace markup-significant characters with HTML entities.
    Escape,
    /// Parse into a date. Values that do not parse stay text.
    ToDate,
}

/// How one field is checked and cleaned.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    field: String,
    presence: Presence,
    repeated: bool,
    checks: Vec<Check>,
    sanitizers: Vec<Sanitizer>,
}

impl FieldRule {
    pub fn required(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_presence(field, Presence::Required { message: message.into() })
    }

    pub fn optional(field: impl Into<String>) -> Self {
        Self::with_presence(field, Presence::Optional)
    }

    /// An optional field that may be submitted several times. Every value is
    /// checked and the output is a [`FieldValue::List`].
    pub fn repeated(field: impl Into<String>) -> Self {
        Self {
            repeated: true,
            ..Self::with_presence(field, Presence::Optional)
        }
    }

    fn with_presence(field: impl Into<String>, presence: Presence) -> Self {
        Self {
            field: field.into(),
            presence,
            repeated: false,
            checks: Vec::new(),
            sanitizers: Vec::new(),
        }
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn sanitize(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizers.push(sanitizer);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub(super) fn apply(&self, form: &FormData, out: &mut SanitizedForm, errors: &mut Vec<FieldError>) {
        if self.repeated {
            self.apply_repeated(form, out, errors);
        } else {
            self.apply_single(form, out, errors);
        }
    }

    /// Trim, then presence, then every check, then the remaining sanitizers.
    /// Checks always see the unescaped value.
    fn apply_single(&self, form: &FormData, out: &mut SanitizedForm, errors: &mut Vec<FieldError>) {
        let value = self.trimmed(form.get(&self.field).unwrap_or_default());

        if value.is_empty() {
            self.report_missing(errors);
            return;
        }

        for check in &self.checks {
            if !check.passes(value) {
                errors.push(check.error(&self.field));
            }
        }

        out.set(&self.field, self.clean(value));
    }

    fn apply_repeated(&self, form: &FormData, out: &mut SanitizedForm, errors: &mut Vec<FieldError>) {
        let values = form
            .get_all(&self.field)
            .iter()
            .map(|raw| self.trimmed(raw))
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>();

        if values.is_empty() {
            self.report_missing(errors);
        }

        // One error per failing check, however many values fail it.
        for check in &self.checks {
            if values.iter().any(|value| !check.passes(value)) {
                errors.push(check.error(&self.field));
            }
        }

        let cleaned = values
            .into_iter()
            .map(|value| self.escaped(value))
            .collect();

        out.set(&self.field, FieldValue::List(cleaned));
    }

    fn report_missing(&self, errors: &mut Vec<FieldError>) {
        if let Presence::Required { message } = &self.presence {
            errors.push(FieldError::new(self.field.as_str(), message.as_str(), "required"));
        }
    }

    fn trimmed<'v>(&self, raw: &'v str) -> &'v str {
        if self.sanitizers.contains(&Sanitizer::Trim) {
            raw.trim()
        } else {
            raw
        }
    }

    fn escaped(&self, value: &str) -> String {
        if self.sanitizers.contains(&Sanitizer::Escape) {
            escape(value)
        } else {
            value.to_string()
        }
    }

    fn clean(&self, value: &str) -> FieldValue {
        let mut text = value.to_string();

        for sanitizer in &self.sanitizers {
            match sanitizer {
                Sanitizer::Trim => {}
                Sanitizer::Escape => text = escape(&text),
                Sanitizer::ToDate => {
                    if let Some(date) = parse_iso_date(&text) {
                        return FieldValue::Date(date);
                    }
                }
            }
        }

        FieldValue::Text(text)
    }
}

/// Replaces `& < > " ' / \` and backtick with HTML entities.
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            other => escaped.push(other),
        }
    }

    escaped
}

pub(crate) fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Pipeline, Validation};

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a> \`"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;&#x2F;a&gt; &#x5C;&#96;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn iso_dates_accept_date_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(1929, 10, 21);

        assert_eq!(parse_iso_date("1929-10-21"), expected);
        assert_eq!(parse_iso_date("1929-10-21T08:00:00Z"), expected);
        assert_eq!(parse_iso_date("21/10/1929"), None);
        assert_eq!(parse_iso_date("1929-02-30"), None);
    }

    #[test]
    fn every_failing_check_is_reported_in_rule_order() {
        let pipeline = Pipeline::new()
            .rule(
                FieldRule::required("code", "Code required.")
                    .check(Check::length(2, 4, "Code must be 2 to 4 characters."))
                    .check(Check::alphanumeric("Code must be alphanumeric.")),
            )
            .rule(FieldRule::required("label", "Label required."));

        let form = FormData::new().with("code", "a-b-c");

        match pipeline.validate(&form) {
            Validation::Invalid { errors, partial } => {
                let codes = errors.iter().map(|e| e.code.as_str()).collect::<Vec<_>>();
                assert_eq!(codes, ["length", "alphanumeric", "required"]);
                assert_eq!(errors[2].field, "label");
                assert_eq!(partial.text("code"), Some("a-b-c"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn optional_blank_values_are_absent() {
        let pipeline = Pipeline::new().rule(
            FieldRule::optional("due_back")
                .check(Check::iso_date("Invalid date"))
                .sanitize(Sanitizer::Trim)
                .sanitize(Sanitizer::ToDate),
        );

        match pipeline.validate(&FormData::new().with("due_back", "   ")) {
            Validation::Valid(clean) => assert_eq!(clean.get("due_back"), None),
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_date_stays_text_for_redisplay() {
        let pipeline = Pipeline::new().rule(
            FieldRule::optional("due_back")
                .check(Check::iso_date("Invalid date"))
                .sanitize(Sanitizer::ToDate),
        );

        match pipeline.validate(&FormData::new().with("due_back", "soon")) {
            Validation::Invalid { errors, partial } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(partial.text("due_back"), Some("soon"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn repeated_fields_collect_every_value() {
        let first = Uuid::new().to_string();
        let second = Uuid::new().to_string();
        let pipeline = Pipeline::new().rule(
            FieldRule::repeated("genre")
                .check(Check::reference("Unknown genre."))
                .sanitize(Sanitizer::Trim),
        );

        let form = FormData::new()
            .with("genre", format!(" {first} "))
            .with("genre", "")
            .with("genre", second.clone());

        match pipeline.validate(&form) {
            Validation::Valid(clean) => assert_eq!(clean.list("genre"), [first, second]),
            other => panic!("expected Valid, got {other:?}"),
        }

        let bad = FormData::new().with("genre", "x").with("genre", "y");
        match pipeline.validate(&bad) {
            Validation::Invalid { errors, .. } => assert_eq!(errors.len(), 1),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
