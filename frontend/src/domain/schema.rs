//! Entity schemas and form validation.
//!
//! A schema is the single source of truth for which fields a resource kind
//! accepts, their semantic types, and which are required. Raw form input is
//! validated into [`ValidatedFields`] before any typed draft (and therefore
//! any network request) is built.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::resource::ResourceKind;

/// Calendar dates travel as ISO-8601 `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Semantic type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free text.
    Text,
    /// ISO-8601 calendar date.
    Date,
    /// Decimal number, e.g. a monetary amount.
    Decimal,
    /// One of a fixed set of lower-case options.
    Choice(&'static [&'static str]),
}

/// Declaration of one field in an [`EntitySchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    label: &'static str,
    field_type: FieldType,
    required: bool,
}

impl FieldSpec {
    /// Declare a field that must be present and non-blank.
    #[must_use]
    pub const fn required(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
            required: true,
        }
    }

    /// Declare a field that may be omitted or left blank.
    #[must_use]
    pub const fn optional(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
            required: false,
        }
    }

    /// Wire and form name of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Human label used for column headers and prompts.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Semantic type of the field.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Whether a blank value is rejected.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// Field declarations for one resource kind.
#[derive(Debug, PartialEq, Eq)]
pub struct EntitySchema {
    kind: ResourceKind,
    fields: &'static [FieldSpec],
}

/// Validation failures raised before a payload reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("{field} is required")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// The form carried a field the schema does not declare.
    #[error("unknown field `{field}`")]
    UnknownField {
        /// Name of the unexpected field.
        field: String,
    },
    /// A date field is not `YYYY-MM-DD`.
    #[error("{field} must be a date in YYYY-MM-DD form, got `{value}`")]
    InvalidDate {
        /// Name of the date field.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
    /// A decimal field is not a finite number.
    #[error("{field} must be a number, got `{value}`")]
    InvalidDecimal {
        /// Name of the decimal field.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
    /// A choice field holds a value outside its options.
    #[error("{field} must be one of {allowed}, got `{value}`")]
    InvalidChoice {
        /// Name of the choice field.
        field: &'static str,
        /// Rejected input.
        value: String,
        /// Comma-separated list of accepted options.
        allowed: String,
    },
    /// A draft asked for a field in a shape the schema does not declare.
    #[error("field `{field}` is not declared with the requested type")]
    SchemaMismatch {
        /// Name of the mismatched field.
        field: &'static str,
    },
}

/// Raw, untyped form values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// # Examples
    /// ```
    /// use frontend::domain::FormFields;
    ///
    /// let fields = FormFields::new().with("name", "Oak House");
    /// assert_eq!(fields.get("name"), Some("Oak House"));
    /// ```
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Overlay `other` on top of `self`; values in `other` win.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether the form holds no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Decimal(f64),
    Choice(&'static str),
}

/// Typed form values that passed schema validation.
///
/// Optional fields left blank are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    values: BTreeMap<&'static str, FieldValue>,
}

impl ValidatedFields {
    /// Required text field.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] when absent,
    /// [`ValidationError::SchemaMismatch`] when not declared as text.
    pub fn text(&self, field: &'static str) -> Result<String, ValidationError> {
        self.optional_text(field)?
            .ok_or(ValidationError::MissingField { field })
    }

    /// Optional text field; blank input yields `None`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::SchemaMismatch`] when not declared as text.
    pub fn optional_text(&self, field: &'static str) -> Result<Option<String>, ValidationError> {
        match self.values.get(field) {
            None => Ok(None),
            Some(FieldValue::Text(value)) => Ok(Some(value.clone())),
            Some(_) => Err(ValidationError::SchemaMismatch { field }),
        }
    }

    /// Required date field.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] or [`ValidationError::SchemaMismatch`].
    pub fn date(&self, field: &'static str) -> Result<NaiveDate, ValidationError> {
        match self.values.get(field) {
            None => Err(ValidationError::MissingField { field }),
            Some(FieldValue::Date(value)) => Ok(*value),
            Some(_) => Err(ValidationError::SchemaMismatch { field }),
        }
    }

    /// Required decimal field.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] or [`ValidationError::SchemaMismatch`].
    pub fn decimal(&self, field: &'static str) -> Result<f64, ValidationError> {
        match self.values.get(field) {
            None => Err(ValidationError::MissingField { field }),
            Some(FieldValue::Decimal(value)) => Ok(*value),
            Some(_) => Err(ValidationError::SchemaMismatch { field }),
        }
    }

    /// Required choice field, returned as the canonical option.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] or [`ValidationError::SchemaMismatch`].
    pub fn choice(&self, field: &'static str) -> Result<&'static str, ValidationError> {
        match self.values.get(field) {
            None => Err(ValidationError::MissingField { field }),
            Some(FieldValue::Choice(value)) => Ok(value),
            Some(_) => Err(ValidationError::SchemaMismatch { field }),
        }
    }
}

impl EntitySchema {
    /// Declare a schema. Field order is the column order of the table.
    #[must_use]
    pub const fn new(kind: ResourceKind, fields: &'static [FieldSpec]) -> Self {
        Self { kind, fields }
    }

    /// Resource kind the schema describes.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Declared fields in display order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Look up one field declaration.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Validate raw form values against the schema.
    ///
    /// Values are trimmed first; a required field that is blank after
    /// trimming counts as missing. Errors are reported for the first failing
    /// field in declaration order, after unknown fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    ///
    /// # Examples
    /// ```
    /// use frontend::domain::{FormFields, ResourceKind, ValidationError};
    ///
    /// let schema = ResourceKind::Property.schema();
    /// let fields = FormFields::new().with("name", "Oak House");
    /// let error = schema.validate(&fields).expect_err("address is missing");
    /// assert_eq!(error, ValidationError::MissingField { field: "address" });
    /// ```
    pub fn validate(&self, fields: &FormFields) -> Result<ValidatedFields, ValidationError> {
        if let Some((unknown, _)) = fields.iter().find(|(name, _)| self.field(name).is_none()) {
            return Err(ValidationError::UnknownField {
                field: unknown.to_owned(),
            });
        }

        let mut values = BTreeMap::new();
        for spec in self.fields {
            let raw = fields.get(spec.name).map(str::trim).unwrap_or_default();
            if raw.is_empty() {
                if spec.required {
                    return Err(ValidationError::MissingField { field: spec.name });
                }
                continue;
            }
            values.insert(spec.name, parse_value(spec, raw)?);
        }
        Ok(ValidatedFields { values })
    }
}

fn parse_value(spec: &FieldSpec, raw: &str) -> Result<FieldValue, ValidationError> {
    match spec.field_type {
        FieldType::Text => Ok(FieldValue::Text(raw.to_owned())),
        FieldType::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(FieldValue::Date)
            .map_err(|_| ValidationError::InvalidDate {
                field: spec.name,
                value: raw.to_owned(),
            }),
        FieldType::Decimal => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(FieldValue::Decimal)
            .ok_or_else(|| ValidationError::InvalidDecimal {
                field: spec.name,
                value: raw.to_owned(),
            }),
        FieldType::Choice(options) => options
            .iter()
            .copied()
            .find(|option| option.eq_ignore_ascii_case(raw))
            .map(FieldValue::Choice)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field: spec.name,
                value: raw.to_owned(),
                allowed: options.join(", "),
            }),
    }
}
