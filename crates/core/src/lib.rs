//! # Visit Core
//!
//! Business-rule validation for patient visits.
//!
//! This crate decides whether a visit may be saved:
//! - Required fields and stop/start ordering
//! - Start date against the patient's (possibly estimated) birthdate
//! - Overlap with the patient's other non-voided visits
//! - Encounters falling outside the visit
//! - Attribute datatypes and occurrence bounds
//!
//! Rule violations are collected per field in a [`FieldErrors`]; infrastructure failures are
//! returned as [`VisitError`].
//!
//! **No storage concerns**: persisted visits are read through the [`VisitRepository`] trait.
//! [`InMemoryVisitRepository`] is provided for tests and the CLI.

pub mod attributes;
pub mod config;
pub mod constants;
pub mod encounter;
pub mod error;
pub mod field_errors;
pub mod interval;
pub mod patient;
pub mod repository;
pub mod validation;
pub mod visit;

pub use attributes::{
    AttributeDatatype, AttributeValue, VisitAttribute, VisitAttributeType,
};
pub use config::ValidationConfig;
pub use encounter::Encounter;
pub use error::{VisitError, VisitResult};
pub use field_errors::{Field, FieldError, FieldErrors};
pub use interval::VisitInterval;
pub use patient::Patient;
pub use repository::{InMemoryVisitRepository, VisitRepository};
pub use validation::VisitValidator;
pub use visit::{Visit, VisitType};

pub use visit_types::{
    AttributeTypeId, EncounterId, IdError, Name, NameError, PatientId, VisitId, VisitTypeId,
};
