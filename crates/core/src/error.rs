use crate::field_errors::FieldErrors;

/// Fatal errors raised while validating a visit.
///
/// Business-rule violations on individual fields are not errors in this sense: they are collected
/// in a [`FieldErrors`] and only become a [`VisitError::Validation`] when a caller asks for a
/// persist-or-reject decision via [`crate::VisitValidator::ensure_valid`].
#[derive(Debug, thiserror::Error)]
pub enum VisitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("visit failed validation: {0}")]
    Validation(FieldErrors),

    #[error("attribute type '{attribute_type}' occurs {count} time(s), below {min_occurs}")]
    AttributeBelowMinOccurs {
        attribute_type: String,
        count: usize,
        min_occurs: u32,
    },
    #[error("attribute type '{attribute_type}' occurs {count} time(s), above {max_occurs}")]
    AttributeAboveMaxOccurs {
        attribute_type: String,
        count: usize,
        max_occurs: u32,
    },

    #[error("visit repository failure: {0}")]
    Repository(String),

    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("fixture schema mismatch at {path}: {source}")]
    Fixture {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl VisitError {
    /// Whether this error is a collected business-rule rejection rather than a structural failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, VisitError::Validation(_))
    }
}

pub type VisitResult<T> = std::result::Result<T, VisitError>;
