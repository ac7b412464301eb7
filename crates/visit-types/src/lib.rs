//! Shared primitive types.
//!
//! This crate holds the small value types that the visit model is built from:
//! - [`Name`] for the display names of visit and attribute types
//! - UUID-backed identifiers ([`VisitId`], [`PatientId`], [`VisitTypeId`],
//!   [`AttributeTypeId`], [`EncounterId`]) so that a patient identifier can never be passed
//!   where a visit identifier is expected

mod ids;

pub use ids::{AttributeTypeId, EncounterId, PatientId, VisitId, VisitTypeId};
pub use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name cannot be blank")]
    Blank,
    #[error("name is {len} characters long; the limit is {max}")]
    TooLong { len: usize, max: usize },
    #[error("name contains a control character")]
    ControlCharacter,
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("invalid {kind} identifier '{input}': {source}")]
    Invalid {
        kind: &'static str,
        input: String,
        #[source]
        source: uuid::Error,
    },
}

/// A display name for a visit type or attribute type.
///
/// Surrounding whitespace is trimmed. The result must be non-empty, at most [`Name::MAX_CHARS`]
/// characters, and free of control characters (so it can be rendered on one line).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Matches the width of the name columns in the visit tables.
    pub const MAX_CHARS: usize = 255;

    pub fn new(input: impl AsRef<str>) -> Result<Self, NameError> {
        let name = input.as_ref().trim();
        if name.is_empty() {
            return Err(NameError::Blank);
        }

        let len = name.chars().count();
        if len > Self::MAX_CHARS {
            return Err(NameError::TooLong {
                len,
                max: Self::MAX_CHARS,
            });
        }
        if name.chars().any(char::is_control) {
            return Err(NameError::ControlCharacter);
        }

        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
