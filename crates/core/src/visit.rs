//! The visit record and its directly referenced types.
//!
//! A [`Visit`] is assembled in memory by an upstream service from user or API input, validated,
//! and then persisted or rejected. Every field the validator treats as required is still an
//! `Option` here: an incomplete visit must be representable so that it can be reported on.

use crate::attributes::VisitAttribute;
use crate::interval::VisitInterval;
use crate::patient::Patient;
use crate::repository::deserialize_yaml;
use crate::{VisitError, VisitResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use visit_types::{Name, PatientId, VisitId, VisitTypeId};

/// Category of visit (outpatient, inpatient, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitType {
    pub id: VisitTypeId,
    pub name: Name,
}

impl VisitType {
    pub fn new(name: Name) -> Self {
        Self {
            id: VisitTypeId::new(),
            name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Visit {
    /// `None` until the visit has been persisted.
    #[serde(default)]
    pub id: Option<VisitId>,
    #[serde(default)]
    pub patient: Option<Patient>,
    #[serde(default)]
    pub visit_type: Option<VisitType>,
    #[serde(default)]
    pub start_datetime: Option<DateTime<Utc>>,
    /// `None` while the visit is still active.
    #[serde(default)]
    pub stop_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub void_reason: Option<String>,
    #[serde(default)]
    pub voided: bool,
    #[serde(default)]
    pub attributes: Vec<VisitAttribute>,
}

impl Visit {
    /// Creates an unsaved visit with the three required fields populated.
    pub fn new(patient: Patient, visit_type: VisitType, start_datetime: DateTime<Utc>) -> Self {
        Self {
            patient: Some(patient),
            visit_type: Some(visit_type),
            start_datetime: Some(start_datetime),
            ..Self::default()
        }
    }

    /// Parse a single visit from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`VisitError::Fixture`] naming the offending field if the YAML does not describe a
    /// visit.
    pub fn from_yaml_str(yaml_text: &str) -> VisitResult<Self> {
        deserialize_yaml(yaml_text)
    }

    pub fn load(path: &Path) -> VisitResult<Self> {
        let yaml_text = std::fs::read_to_string(path).map_err(VisitError::FileRead)?;
        Self::from_yaml_str(&yaml_text)
    }

    pub fn with_id(mut self, id: VisitId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_stop_datetime(mut self, stop_datetime: DateTime<Utc>) -> Self {
        self.stop_datetime = Some(stop_datetime);
        self
    }

    pub fn add_attribute(&mut self, attribute: VisitAttribute) {
        self.attributes.push(attribute);
    }

    /// Attributes that have not been voided.
    pub fn active_attributes(&self) -> impl Iterator<Item = &VisitAttribute> {
        self.attributes.iter().filter(|a| !a.voided)
    }

    pub fn patient_id(&self) -> Option<PatientId> {
        self.patient.as_ref().and_then(|p| p.id)
    }

    /// A visit without a stop time is still in progress.
    pub fn is_active(&self) -> bool {
        self.stop_datetime.is_none()
    }

    /// The span this visit occupies, or `None` when it has no start time.
    pub fn interval(&self) -> Option<VisitInterval> {
        VisitInterval::from_visit(self)
    }
}
