//! Cash-flow rules
//!
//! A [`RawRule`] is what the user edits: mostly free text, validated only when
//! the rule set is compiled. A [`CompiledRule`] is the normalized form the
//! simulation consumes.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};

use super::ids::CategoryId;
use super::lenient;
use crate::date_math::{add_months_clamped, add_years_clamped};
use crate::error::RuleError;

/// Whether a rule adds money to the balance or takes it away
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    In,
    Out,
}

impl Direction {
    pub fn sign(self) -> i64 {
        match self {
            Direction::In => 1,
            Direction::Out => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
        }
    }
}

/// How often a rule fires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "One time")]
    OneTime,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::OneTime,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    /// Name as stored in saved state
    pub fn label(self) -> &'static str {
        match self {
            Frequency::OneTime => "One time",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }

    /// The next occurrence after `date`, re-clamped to the rule's anchor.
    /// `None` for one-time rules.
    pub fn step(self, date: Date, anchor_day: i8, anchor_month: i8) -> Option<Date> {
        match self {
            Frequency::OneTime => None,
            Frequency::Monthly => Some(add_months_clamped(date, 1, Some(anchor_day))),
            Frequency::Quarterly => Some(add_months_clamped(date, 3, Some(anchor_day))),
            Frequency::Yearly => Some(add_years_clamped(
                date,
                1,
                Some(anchor_day),
                Some(anchor_month),
            )),
        }
    }
}

/// How a single occurrence lands on the balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effective {
    /// The whole amount on the occurrence day
    #[default]
    Immediate,
    /// Spread evenly from the occurrence day up to one month later
    #[serde(rename = "Spread 1 month")]
    SpreadMonth,
    /// Spread evenly over three months
    #[serde(rename = "Spread quarter")]
    SpreadQuarter,
    /// Spread evenly over one year
    #[serde(rename = "Spread year")]
    SpreadYear,
}

impl Effective {
    pub const ALL: [Effective; 4] = [
        Effective::Immediate,
        Effective::SpreadMonth,
        Effective::SpreadQuarter,
        Effective::SpreadYear,
    ];

    /// Name as stored in saved state
    pub fn label(self) -> &'static str {
        match self {
            Effective::Immediate => "Immediate",
            Effective::SpreadMonth => "Spread 1 month",
            Effective::SpreadQuarter => "Spread quarter",
            Effective::SpreadYear => "Spread year",
        }
    }

    /// Exclusive end of the spreading period starting at `date`.
    /// `None` for immediate rules.
    pub fn spread_end(self, date: Date) -> Option<Date> {
        match self {
            Effective::Immediate => None,
            Effective::SpreadMonth => Some(add_months_clamped(date, 1, None)),
            Effective::SpreadQuarter => Some(add_months_clamped(date, 3, None)),
            Effective::SpreadYear => Some(add_years_clamped(date, 1, None, None)),
        }
    }
}

/// Calendar unit of an escalation interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationUnit {
    #[default]
    Month,
    Year,
}

impl EscalationUnit {
    /// Advance `date` by `every` units, clamped to the rule's anchor.
    pub fn advance(self, date: Date, every: u32, anchor_day: i8, anchor_month: i8) -> Date {
        let every = every.min(i32::MAX as u32) as i32;
        match self {
            EscalationUnit::Month => add_months_clamped(date, every, Some(anchor_day)),
            EscalationUnit::Year => {
                add_years_clamped(date, every, Some(anchor_day), Some(anchor_month))
            }
        }
    }
}

impl<'de> Deserialize<'de> for EscalationUnit {
    /// Anything other than `"year"` reads as monthly.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = lenient::text(deserializer)?;
        Ok(if text.trim().eq_ignore_ascii_case("year") {
            EscalationUnit::Year
        } else {
            EscalationUnit::Month
        })
    }
}

fn default_escalation_every() -> String {
    "1".to_string()
}

/// A rule exactly as the user entered it.
///
/// Text fields are kept verbatim so that a half-typed row survives a save and
/// reload; the compiler decides what they mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    #[serde(default)]
    pub direction: Direction,
    /// Decimal amount in major units, e.g. `"1200.00"`
    #[serde(default, deserialize_with = "lenient::text")]
    pub amount: String,
    /// Anchor day and month, `"D.M"`
    #[serde(default, deserialize_with = "lenient::text")]
    pub date_str: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub year: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub effective: Effective,
    /// Inclusive last day, `YYYY-MM-DD`, empty for open-ended rules
    #[serde(default, deserialize_with = "lenient::text")]
    pub end_date: String,
    /// Growth per interval in percent, empty for none
    #[serde(default, deserialize_with = "lenient::text")]
    pub escalation_pct: String,
    #[serde(
        default = "default_escalation_every",
        deserialize_with = "lenient::text"
    )]
    pub escalation_every: String,
    #[serde(default)]
    pub escalation_unit: EscalationUnit,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Single free-text label written by older versions
    #[serde(default, skip_serializing)]
    pub note: Option<String>,
}

impl Default for RawRule {
    fn default() -> Self {
        Self {
            direction: Direction::In,
            amount: String::new(),
            date_str: String::new(),
            year: String::new(),
            frequency: Frequency::Monthly,
            effective: Effective::Immediate,
            end_date: String::new(),
            escalation_pct: String::new(),
            escalation_every: default_escalation_every(),
            escalation_unit: EscalationUnit::Month,
            labels: Vec::new(),
            note: None,
        }
    }
}

impl RawRule {
    /// A rule with no amount, date, year or labels; it is skipped, not rejected.
    pub fn is_empty(&self) -> bool {
        self.amount.is_empty()
            && self.date_str.is_empty()
            && self.year.is_empty()
            && self.labels.is_empty()
    }

    /// Bring an older saved shape up to date.
    pub fn normalize(&mut self) {
        if let Some(note) = self.note.take()
            && self.labels.is_empty()
            && !note.trim().is_empty()
        {
            self.labels = vec![note.trim().to_string()];
        }
        if self.escalation_every.trim().is_empty() {
            self.escalation_every = default_escalation_every();
        }
    }
}

/// Periodic growth applied to a rule's amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    /// Growth per interval in percent, finite, non-zero and above -100
    pub percent: f64,
    /// Interval length, at least 1
    pub every: u32,
    pub unit: EscalationUnit,
}

/// A validated rule ready for occurrence generation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    /// Position of the source rule in the caller's list
    pub source_index: usize,
    /// Signed amount per occurrence in minor units, never zero
    pub amount_minor: i64,
    /// The anchor date; also the escalation origin
    pub first_occurrence: Date,
    pub anchor_day: i8,
    pub anchor_month: i8,
    pub frequency: Frequency,
    pub effective: Effective,
    /// Categories sharing each occurrence, never empty
    pub categories: Vec<CategoryId>,
    /// Exclusive end, never later than the simulation window end
    pub end_exclusive: Date,
    pub escalation: Option<Escalation>,
}

/// Outcome of compiling one raw rule, reported back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    /// Nothing entered yet
    Empty,
    /// Accepted (it may still contribute nothing, e.g. a zero amount)
    Valid,
    Invalid(RuleError),
}

impl RuleStatus {
    pub fn is_invalid(&self) -> bool {
        matches!(self, RuleStatus::Invalid(_))
    }

    pub fn error(&self) -> Option<&RuleError> {
        match self {
            RuleStatus::Invalid(e) => Some(e),
            _ => None,
        }
    }
}
