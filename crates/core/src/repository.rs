//! Read access to persisted visit data.
//!
//! The validator needs to look at a patient's other visits, the stored copy of the visit being
//! edited, the encounters recorded against it, and the configured attribute types. Those lookups
//! go through the [`VisitRepository`] trait so the rules can run against any storage backend.
//!
//! [`InMemoryVisitRepository`] is the in-process implementation used by tests and the CLI. It can
//! be built up programmatically or loaded from a YAML history file:
//!
//! ```text
//! attribute_types:
//!   - id: 0b3f5a7e-9c1d-4e2f-8a6b-1c2d3e4f5a6b
//!     name: Audit Date
//!     datatype: date
//!     max_occurs: 1
//! visits:
//!   - id: c2639863-cbbe-44bb-986d-8a4820f8ae14
//!     patient: { id: 5946f880-b197-400b-9caa-a3c661d23041 }
//!     visit_type: { id: 7b0f5697-27e3-40c4-8bae-f4049abfb4ed, name: Outpatient }
//!     start_datetime: 2014-01-04T10:00:00Z
//!     stop_datetime: 2014-01-10T14:00:00Z
//! encounters: []
//! ```

use crate::attributes::VisitAttributeType;
use crate::encounter::Encounter;
use crate::visit::Visit;
use crate::{VisitError, VisitResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use visit_types::{PatientId, VisitId};

/// Lookups the visit validator depends on.
///
/// Implementations report infrastructure failures as [`VisitError::Repository`]; the validator
/// propagates them unchanged rather than treating them as rule violations.
pub trait VisitRepository {
    /// All visits of a patient, newest start first.
    fn find_visits_for_patient(
        &self,
        patient_id: &PatientId,
        include_voided: bool,
    ) -> VisitResult<Vec<Visit>>;

    /// The persisted state of a visit, if it exists.
    fn find_visit(&self, visit_id: &VisitId) -> VisitResult<Option<Visit>>;

    fn find_encounters_for_visit(
        &self,
        visit_id: &VisitId,
        include_voided: bool,
    ) -> VisitResult<Vec<Encounter>>;

    fn visit_attribute_types(&self) -> VisitResult<Vec<VisitAttributeType>>;
}

impl<R: VisitRepository + ?Sized> VisitRepository for &R {
    fn find_visits_for_patient(
        &self,
        patient_id: &PatientId,
        include_voided: bool,
    ) -> VisitResult<Vec<Visit>> {
        (**self).find_visits_for_patient(patient_id, include_voided)
    }

    fn find_visit(&self, visit_id: &VisitId) -> VisitResult<Option<Visit>> {
        (**self).find_visit(visit_id)
    }

    fn find_encounters_for_visit(
        &self,
        visit_id: &VisitId,
        include_voided: bool,
    ) -> VisitResult<Vec<Encounter>> {
        (**self).find_encounters_for_visit(visit_id, include_voided)
    }

    fn visit_attribute_types(&self) -> VisitResult<Vec<VisitAttributeType>> {
        (**self).visit_attribute_types()
    }
}

impl<R: VisitRepository + ?Sized> VisitRepository for Arc<R> {
    fn find_visits_for_patient(
        &self,
        patient_id: &PatientId,
        include_voided: bool,
    ) -> VisitResult<Vec<Visit>> {
        (**self).find_visits_for_patient(patient_id, include_voided)
    }

    fn find_visit(&self, visit_id: &VisitId) -> VisitResult<Option<Visit>> {
        (**self).find_visit(visit_id)
    }

    fn find_encounters_for_visit(
        &self,
        visit_id: &VisitId,
        include_voided: bool,
    ) -> VisitResult<Vec<Encounter>> {
        (**self).find_encounters_for_visit(visit_id, include_voided)
    }

    fn visit_attribute_types(&self) -> VisitResult<Vec<VisitAttributeType>> {
        (**self).visit_attribute_types()
    }
}

/// Deserialize YAML, naming the failing field on a schema mismatch
/// (e.g. `visits.2.start_datetime`).
pub(crate) fn deserialize_yaml<T: DeserializeOwned>(yaml_text: &str) -> VisitResult<T> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        VisitError::Fixture {
            path,
            source: err.into_inner(),
        }
    })
}

/// Wire shape of a YAML history file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct VisitHistory {
    attribute_types: Vec<VisitAttributeType>,
    visits: Vec<Visit>,
    encounters: Vec<Encounter>,
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryVisitRepository {
    visits: Vec<Visit>,
    encounters: Vec<Encounter>,
    attribute_types: Vec<VisitAttributeType>,
}

impl InMemoryVisitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a persisted visit. Visits without an identity are given one.
    pub fn with_visit(mut self, mut visit: Visit) -> Self {
        visit.id.get_or_insert_with(VisitId::new);
        self.visits.push(visit);
        self
    }

    pub fn with_encounter(mut self, encounter: Encounter) -> Self {
        self.encounters.push(encounter);
        self
    }

    pub fn with_attribute_type(mut self, attribute_type: VisitAttributeType) -> Self {
        self.attribute_types.push(attribute_type);
        self
    }

    /// Parse a repository from YAML history text.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::Fixture`] if the YAML does not match the history schema, including
    /// unknown keys.
    pub fn from_yaml_str(yaml_text: &str) -> VisitResult<Self> {
        let history: VisitHistory = deserialize_yaml(yaml_text)?;

        let mut repository = Self {
            visits: Vec::with_capacity(history.visits.len()),
            encounters: history.encounters,
            attribute_types: history.attribute_types,
        };
        for visit in history.visits {
            repository = repository.with_visit(visit);
        }

        tracing::debug!(
            visits = repository.visits.len(),
            encounters = repository.encounters.len(),
            attribute_types = repository.attribute_types.len(),
            "loaded visit history"
        );

        Ok(repository)
    }

    /// Read and parse a YAML history file.
    pub fn load(path: &Path) -> VisitResult<Self> {
        let yaml_text = std::fs::read_to_string(path).map_err(VisitError::FileRead)?;
        Self::from_yaml_str(&yaml_text)
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }
}

impl VisitRepository for InMemoryVisitRepository {
    fn find_visits_for_patient(
        &self,
        patient_id: &PatientId,
        include_voided: bool,
    ) -> VisitResult<Vec<Visit>> {
        let mut visits: Vec<Visit> = self
            .visits
            .iter()
            .filter(|v| v.patient_id().as_ref() == Some(patient_id))
            .filter(|v| include_voided || !v.voided)
            .cloned()
            .collect();

        // Newest first; visits without a start sort last.
        visits.sort_by(|a, b| b.start_datetime.cmp(&a.start_datetime));
        Ok(visits)
    }

    fn find_visit(&self, visit_id: &VisitId) -> VisitResult<Option<Visit>> {
        Ok(self
            .visits
            .iter()
            .find(|v| v.id.as_ref() == Some(visit_id))
            .cloned())
    }

    fn find_encounters_for_visit(
        &self,
        visit_id: &VisitId,
        include_voided: bool,
    ) -> VisitResult<Vec<Encounter>> {
        Ok(self
            .encounters
            .iter()
            .filter(|e| e.visit_id.as_ref() == Some(visit_id))
            .filter(|e| include_voided || !e.voided)
            .cloned()
            .collect())
    }

    fn visit_attribute_types(&self) -> VisitResult<Vec<VisitAttributeType>> {
        Ok(self.attribute_types.clone())
    }
}
