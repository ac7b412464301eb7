//! UUID-backed identifiers.
//!
//! Each identifier wraps a [`Uuid`] and displays in the standard hyphenated form
//! (for example `c2639863-cbbe-44bb-986d-8a4820f8ae14`). Parsing accepts any form the `uuid`
//! crate understands, so identifiers copied from other systems round-trip.

use crate::IdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocates a fresh random (v4) identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses an identifier from its textual form.
            pub fn parse(input: &str) -> Result<Self, IdError> {
                Uuid::parse_str(input.trim())
                    .map(Self)
                    .map_err(|source| IdError::Invalid {
                        kind: $kind,
                        input: input.to_string(),
                        source,
                    })
            }

            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }
    };
}

uuid_id!(
    /// Identity of a persisted visit.
    VisitId,
    "visit"
);
uuid_id!(
    /// Identity of a patient.
    PatientId,
    "patient"
);
uuid_id!(VisitTypeId, "visit type");
uuid_id!(AttributeTypeId, "attribute type");
uuid_id!(EncounterId, "encounter");
