//! Visit time spans and the overlap test between them.
//!
//! A visit occupies `[start, stop]`, or `[start, +∞)` while it has no stop time. Intervals are
//! closed: two visits that merely touch (one stops at the instant the other starts) overlap.

use crate::visit::Visit;
use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisitInterval {
    start: DateTime<Utc>,
    stop: Option<DateTime<Utc>>,
}

impl VisitInterval {
    pub fn new(start: DateTime<Utc>, stop: Option<DateTime<Utc>>) -> Self {
        Self { start, stop }
    }

    pub fn from_visit(visit: &Visit) -> Option<Self> {
        visit
            .start_datetime
            .map(|start| Self::new(start, visit.stop_datetime))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn stop(&self) -> Option<DateTime<Utc>> {
        self.stop
    }

    pub fn is_open_ended(&self) -> bool {
        self.stop.is_none()
    }

    /// Whether this interval is still running at or after `instant`.
    fn reaches(&self, instant: DateTime<Utc>) -> bool {
        self.stop.map_or(true, |stop| stop >= instant)
    }

    /// Closed-interval intersection, with a missing stop treated as unbounded.
    pub fn overlaps(&self, other: &VisitInterval) -> bool {
        other.reaches(self.start) && self.reaches(other.start)
    }
}
