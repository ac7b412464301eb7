//! Patient fields consulted during visit validation.
//!
//! Only the subset of the patient record that visit rules depend on is modelled here: identity
//! (to look up the patient's other visits) and the birth/death dates used to bound how early a
//! visit may start.

use crate::constants::MIN_ESTIMATED_BIRTHDATE_GRACE_YEARS;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use visit_types::PatientId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Patient {
    /// `None` for a patient that has not been persisted yet.
    #[serde(default)]
    pub id: Option<PatientId>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    /// Whether `birthdate` is an estimate rather than a recorded fact.
    #[serde(default)]
    pub birthdate_estimated: bool,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
}

impl Patient {
    pub fn with_id(id: PatientId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Whole years between birth and death, when both are recorded.
    ///
    /// A death date before the birthdate yields zero.
    pub fn lifespan_years(&self) -> Option<u32> {
        let birthdate = self.birthdate?;
        let death_date = self.death_date?;
        Some(whole_years_between(birthdate, death_date))
    }

    /// Grace period, in whole years, applied in front of an estimated birthdate.
    ///
    /// An estimated birthdate is assumed to be off by up to half the patient's recorded lifespan,
    /// and never by less than [`MIN_ESTIMATED_BIRTHDATE_GRACE_YEARS`]. Patients without a
    /// recorded death date get the minimum.
    pub fn estimated_birthdate_grace_years(&self) -> u32 {
        let half_lifespan = self.lifespan_years().unwrap_or(0) / 2;
        half_lifespan.max(MIN_ESTIMATED_BIRTHDATE_GRACE_YEARS)
    }

    /// The earliest calendar date on which a visit for this patient may start.
    ///
    /// Returns `None` when no birthdate is recorded, in which case no floor applies.
    pub fn earliest_visit_date(&self) -> Option<NaiveDate> {
        let birthdate = self.birthdate?;
        if !self.birthdate_estimated {
            return Some(birthdate);
        }

        let grace = Months::new(self.estimated_birthdate_grace_years().saturating_mul(12));
        Some(birthdate.checked_sub_months(grace).unwrap_or(NaiveDate::MIN))
    }
}

fn whole_years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}
