//! Constants used throughout the visit core crate.
//!
//! Message codes are the stable identifiers callers key translations on; the
//! default messages attached to field errors are English fallbacks only.

/// Default maximum length of `voidReason`, matching the storage column width.
pub const DEFAULT_VOID_REASON_MAX_LENGTH: usize = 255;

/// Environment variable toggling whether a patient may have overlapping visits.
pub const ALLOW_OVERLAPPING_VISITS_ENV: &str = "VISIT_ALLOW_OVERLAPPING_VISITS";

/// Environment variable overriding the maximum `voidReason` length.
pub const VOID_REASON_MAX_LENGTH_ENV: &str = "VISIT_VOID_REASON_MAX_LENGTH";

/// Minimum grace period, in years, applied to an estimated birthdate.
pub const MIN_ESTIMATED_BIRTHDATE_GRACE_YEARS: u32 = 1;

pub const PATIENT_REQUIRED: &str = "Visit.error.patient.required";
pub const VISIT_TYPE_REQUIRED: &str = "Visit.error.visitType.required";
pub const START_DATE_REQUIRED: &str = "Visit.error.startDate.required";
pub const END_DATE_BEFORE_START_DATE: &str = "Visit.error.endDateBeforeStartDate";
pub const START_BEFORE_BIRTH_DATE: &str =
    "Visit.startDateCannotFallBeforeTheBirthDateOfTheSamePatient";
pub const OVERLAPS_ANOTHER_VISIT: &str = "Visit.visitCannotOverlapAnotherVisitOfTheSamePatient";
pub const ENCOUNTERS_BEFORE_START_DATE: &str = "Visit.encountersCannotBeBeforeStartDate";
pub const ENCOUNTERS_AFTER_STOP_DATE: &str = "Visit.encountersCannotBeAfterStopDate";
pub const ATTRIBUTE_INVALID: &str = "Visit.error.attribute.invalid";
pub const EXCEEDED_MAX_LENGTH: &str = "error.exceededMaxLengthOfField";
