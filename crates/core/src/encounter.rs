use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use visit_types::{EncounterId, VisitId};

/// A clinical encounter, as far as visit validation is concerned: when it happened and which
/// visit it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Encounter {
    pub id: EncounterId,
    #[serde(default)]
    pub visit_id: Option<VisitId>,
    pub encounter_datetime: DateTime<Utc>,
    #[serde(default)]
    pub voided: bool,
}

impl Encounter {
    pub fn new(visit_id: VisitId, encounter_datetime: DateTime<Utc>) -> Self {
        Self {
            id: EncounterId::new(),
            visit_id: Some(visit_id),
            encounter_datetime,
            voided: false,
        }
    }
}
