//! Field-scoped error collection.
//!
//! The validator reports business-rule violations by appending entries to a [`FieldErrors`]
//! rather than returning early, so a single pass can flag any combination of fields. Each entry
//! pairs the offending [`Field`] with a stable message code.

use serde::Serialize;
use std::fmt;

/// The visit fields a validation error can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Patient,
    VisitType,
    StartDatetime,
    StopDatetime,
    VoidReason,
    Attributes,
}

impl Field {
    /// The field name as exposed to callers (`startDatetime`, `voidReason`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Patient => "patient",
            Field::VisitType => "visitType",
            Field::StartDatetime => "startDatetime",
            Field::StopDatetime => "stopDatetime",
            Field::VoidReason => "voidReason",
            Field::Attributes => "attributes",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_message: Option<String>,
}

/// Ordered collection of field errors produced by one validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error on `field` with the given message code.
    pub fn reject(&mut self, field: Field, code: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            code: code.into(),
            default_message: None,
        });
    }

    /// Records an error carrying an English fallback message.
    pub fn reject_with_message(
        &mut self,
        field: Field,
        code: impl Into<String>,
        default_message: impl Into<String>,
    ) {
        self.errors.push(FieldError {
            field,
            code: code.into(),
            default_message: Some(default_message.into()),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_field_errors(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn has_field_error(&self, field: Field, code: &str) -> bool {
        self.errors.iter().any(|e| e.field == field && e.code == code)
    }

    pub fn field_errors(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("no field errors");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.code)?;
        }
        Ok(())
    }
}
