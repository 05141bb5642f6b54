//! Occurrence generation
//!
//! Expands a compiled rule into the concrete dates it fires on inside the
//! simulation window.

use jiff::civil::Date;

use crate::model::{CompiledRule, Frequency, SimulationWindow};

/// Lazy, strictly increasing sequence of occurrence dates for one rule.
///
/// Recurring rules are fast-forwarded from their anchor to the first date on
/// or after the window start; every step is re-clamped to the anchor day (and
/// anchor month for yearly rules), so a rule on the 31st visits Feb 28/29 and
/// returns to the 31st afterwards.
#[derive(Debug, Clone)]
pub struct Occurrences {
    next: Option<Date>,
    start: Date,
    end: Date,
    frequency: Frequency,
    anchor_day: i8,
    anchor_month: i8,
}

impl Occurrences {
    pub fn new(rule: &CompiledRule, window: &SimulationWindow) -> Self {
        let mut occurrences = Self {
            next: Some(rule.first_occurrence),
            start: window.start,
            end: rule.end_exclusive.min(window.end),
            frequency: rule.frequency,
            anchor_day: rule.anchor_day,
            anchor_month: rule.anchor_month,
        };
        if rule.frequency != Frequency::OneTime {
            while let Some(current) = occurrences.next
                && current < occurrences.start
            {
                occurrences.next = occurrences.step(current);
            }
        }
        occurrences
    }

    /// The date after `current`, `None` once the calendar stops advancing.
    fn step(&self, current: Date) -> Option<Date> {
        self.frequency
            .step(current, self.anchor_day, self.anchor_month)
            .filter(|&next| next > current)
    }
}

impl Iterator for Occurrences {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        loop {
            let current = self.next.filter(|&d| d < self.end)?;
            self.next = self.step(current);
            // Only a one-time rule can still sit before the window start here
            if current >= self.start {
                return Some(current);
            }
        }
    }
}

/// Occurrence dates of `rule` inside `window`.
pub fn occurrences(rule: &CompiledRule, window: &SimulationWindow) -> Occurrences {
    Occurrences::new(rule, window)
}
