use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{add_years_clamped, dates_from, day_index};

/// The simulated span: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationWindow {
    pub start: Date,
    pub end: Date,
}

impl SimulationWindow {
    /// A window of `years` years from `start`. The end keeps the start's own
    /// day and month, clamped (a Feb 29 start ends on Feb 28 in common years).
    ///
    /// `None` when the window would be empty or inverted.
    pub fn new(start: Date, years: i32) -> Option<Self> {
        let end = add_years_clamped(start, years, Some(start.day()), Some(start.month()));
        Self::between(start, end)
    }

    /// A window over explicit bounds, `None` unless `end > start`.
    pub fn between(start: Date, end: Date) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn total_days(&self) -> usize {
        day_index(self.start, self.end) as usize
    }

    /// Day offset of `date` from the window start (may be negative or past the end).
    #[inline]
    pub fn index_of(&self, date: Date) -> i32 {
        day_index(self.start, date)
    }

    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && date < self.end
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> {
        dates_from(self.start, self.total_days())
    }
}
