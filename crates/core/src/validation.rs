//! Visit validation.
//!
//! [`VisitValidator`] checks a candidate visit against the business rules that must hold before it
//! may be saved. The rules are independent of one another: each one inspects the visit and appends
//! to a [`FieldErrors`] collector, so a single pass can flag several fields at once. Only
//! structural failures stop a pass early:
//!
//! - a repository lookup failing ([`VisitError::Repository`]);
//! - an attribute type's `min_occurs`/`max_occurs` bounds being violated.
//!
//! Rules, in evaluation order:
//!
//! 1. `patient`, `visitType` and `startDatetime` are present.
//! 2. `stopDatetime` is not before `startDatetime`.
//! 3. A persisted visit does not exclude any of its own encounters.
//! 4. The visit does not start before the patient's birthdate (less a grace period when the
//!    birthdate is estimated).
//! 5. Unless overlapping visits are allowed, a non-voided visit does not overlap another
//!    non-voided visit of the same patient. Closing an active visit without moving its start is
//!    exempt.
//! 6. Attribute values match their types, and each type occurs within its bounds.
//! 7. `voidReason` fits the configured length.

use crate::attributes::{validate_attribute_values, validate_occurrences};
use crate::config::ValidationConfig;
use crate::constants::{
    END_DATE_BEFORE_START_DATE, ENCOUNTERS_AFTER_STOP_DATE, ENCOUNTERS_BEFORE_START_DATE,
    EXCEEDED_MAX_LENGTH, OVERLAPS_ANOTHER_VISIT, PATIENT_REQUIRED, START_BEFORE_BIRTH_DATE,
    START_DATE_REQUIRED, VISIT_TYPE_REQUIRED,
};
use crate::field_errors::{Field, FieldErrors};
use crate::repository::VisitRepository;
use crate::visit::Visit;
use crate::{VisitError, VisitResult};
use std::sync::Arc;

/// Validates visits against a repository of existing visit data.
///
/// The validator holds no per-call state; one instance can be shared across threads when the
/// repository allows it.
#[derive(Clone, Debug)]
pub struct VisitValidator<R> {
    cfg: Arc<ValidationConfig>,
    repository: R,
}

impl<R: VisitRepository> VisitValidator<R> {
    pub fn new(cfg: Arc<ValidationConfig>, repository: R) -> Self {
        Self { cfg, repository }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.cfg
    }

    /// Runs every rule against `visit`, appending violations to `errors`.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions: a failed repository lookup, or an attribute
    /// type occurring fewer than `min_occurs` or more than `max_occurs` times. Field errors
    /// recorded before the failure remain in `errors`.
    pub fn validate(&self, visit: &Visit, errors: &mut FieldErrors) -> VisitResult<()> {
        check_required_fields(visit, errors);
        check_stop_not_before_start(visit, errors);
        self.check_encounter_window(visit, errors)?;
        check_birthdate_floor(visit, errors);

        // A voided visit no longer occupies its interval.
        if !self.cfg.allow_overlapping_visits() && !visit.voided {
            self.check_overlap(visit, errors)?;
        }

        self.check_attributes(visit, errors)?;
        check_void_reason_length(visit, self.cfg.void_reason_max_length(), errors);

        Ok(())
    }

    /// Validates into a fresh collector.
    pub fn validate_visit(&self, visit: &Visit) -> VisitResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        self.validate(visit, &mut errors)?;
        Ok(errors)
    }

    /// Persist-or-reject gate: any field error becomes [`VisitError::Validation`].
    pub fn ensure_valid(&self, visit: &Visit) -> VisitResult<()> {
        let errors = self.validate_visit(visit)?;
        if errors.has_errors() {
            return Err(VisitError::Validation(errors));
        }
        Ok(())
    }

    fn check_encounter_window(&self, visit: &Visit, errors: &mut FieldErrors) -> VisitResult<()> {
        let (Some(visit_id), Some(start)) = (visit.id, visit.start_datetime) else {
            return Ok(());
        };

        let encounters = logged(
            self.repository.find_encounters_for_visit(&visit_id, false),
            "find_encounters_for_visit",
        )?;

        let mut active = encounters.iter().filter(|e| !e.voided);

        if active.clone().any(|e| e.encounter_datetime < start) {
            errors.reject_with_message(
                Field::StartDatetime,
                ENCOUNTERS_BEFORE_START_DATE,
                "Encounters cannot be dated before the visit starts.",
            );
        } else if let Some(stop) = visit.stop_datetime {
            if active.any(|e| e.encounter_datetime > stop) {
                errors.reject_with_message(
                    Field::StopDatetime,
                    ENCOUNTERS_AFTER_STOP_DATE,
                    "Encounters cannot be dated after the visit stops.",
                );
            }
        }

        Ok(())
    }

    fn check_overlap(&self, visit: &Visit, errors: &mut FieldErrors) -> VisitResult<()> {
        let (Some(candidate), Some(patient_id)) = (visit.interval(), visit.patient_id()) else {
            return Ok(());
        };

        if self.is_end_visit(visit)? {
            tracing::debug!(
                visit_id = ?visit.id,
                "closing an active visit without moving its start; skipping overlap check"
            );
            return Ok(());
        }

        let others = logged(
            self.repository.find_visits_for_patient(&patient_id, false),
            "find_visits_for_patient",
        )?;

        let conflict = others
            .iter()
            .filter(|other| !other.voided)
            .filter(|other| !(visit.id.is_some() && other.id == visit.id))
            .find(|other| other.interval().is_some_and(|i| candidate.overlaps(&i)));

        if let Some(other) = conflict {
            tracing::debug!(
                visit_id = ?visit.id,
                conflicting_visit_id = ?other.id,
                "visit overlaps another visit of the same patient"
            );
            errors.reject(Field::StartDatetime, OVERLAPS_ANOTHER_VISIT);
        }

        Ok(())
    }

    /// An "end visit" update sets a stop time on a persisted, still-active visit whose start time
    /// is unchanged. Start times are compared at whole-second precision.
    fn is_end_visit(&self, visit: &Visit) -> VisitResult<bool> {
        let (Some(visit_id), Some(start), Some(_)) =
            (visit.id, visit.start_datetime, visit.stop_datetime)
        else {
            return Ok(false);
        };

        let Some(persisted) = logged(self.repository.find_visit(&visit_id), "find_visit")? else {
            return Ok(false);
        };

        let start_unchanged = persisted
            .start_datetime
            .is_some_and(|persisted_start| persisted_start.timestamp() == start.timestamp());

        Ok(persisted.stop_datetime.is_none() && start_unchanged)
    }

    fn check_attributes(&self, visit: &Visit, errors: &mut FieldErrors) -> VisitResult<()> {
        let attribute_types = logged(
            self.repository.visit_attribute_types(),
            "visit_attribute_types",
        )?;

        validate_attribute_values(visit, &attribute_types, errors);
        validate_occurrences(visit, &attribute_types)
    }
}

fn logged<T>(result: VisitResult<T>, lookup: &str) -> VisitResult<T> {
    if let Err(err) = &result {
        tracing::warn!("visit repository lookup {lookup} failed: {err}");
    }
    result
}

fn check_required_fields(visit: &Visit, errors: &mut FieldErrors) {
    if visit.patient.is_none() {
        errors.reject(Field::Patient, PATIENT_REQUIRED);
    }
    if visit.visit_type.is_none() {
        errors.reject(Field::VisitType, VISIT_TYPE_REQUIRED);
    }
    if visit.start_datetime.is_none() {
        errors.reject(Field::StartDatetime, START_DATE_REQUIRED);
    }
}

fn check_stop_not_before_start(visit: &Visit, errors: &mut FieldErrors) {
    if let (Some(start), Some(stop)) = (visit.start_datetime, visit.stop_datetime) {
        if stop < start {
            errors.reject(Field::StopDatetime, END_DATE_BEFORE_START_DATE);
        }
    }
}

fn check_birthdate_floor(visit: &Visit, errors: &mut FieldErrors) {
    let (Some(patient), Some(start)) = (visit.patient.as_ref(), visit.start_datetime) else {
        return;
    };
    let Some(earliest) = patient.earliest_visit_date() else {
        return;
    };

    if start.date_naive() < earliest {
        errors.reject(Field::StartDatetime, START_BEFORE_BIRTH_DATE);
    }
}

fn check_void_reason_length(visit: &Visit, max_length: usize, errors: &mut FieldErrors) {
    let Some(void_reason) = visit.void_reason.as_deref() else {
        return;
    };

    if void_reason.chars().count() > max_length {
        errors.reject_with_message(
            Field::VoidReason,
            EXCEEDED_MAX_LENGTH,
            format!("voidReason exceeds the maximum length of {max_length} characters"),
        );
    }
}
