//! Rule Builder DSL
//!
//! ```ignore
//! use cashflow_core::config::RuleBuilder;
//!
//! // Rent on the 1st, 3% more every year
//! let rent = RuleBuilder::expense("1450").on(1, 1, 2024).label("Rent").escalate_yearly(3.0);
//!
//! // Annual insurance premium booked evenly over the year
//! let insurance = RuleBuilder::expense("1200").on(15, 3, 2024).yearly().spread_year();
//! ```

use crate::model::{Direction, Effective, EscalationUnit, Frequency, RawRule};

/// Builder for a single [`RawRule`]; defaults to a monthly, immediate rule
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule: RawRule,
}

impl RuleBuilder {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Money coming in; `amount` is decimal text in major units
    pub fn income(amount: impl Into<String>) -> Self {
        Self::new(Direction::In, amount)
    }

    /// Money going out; `amount` is decimal text in major units
    pub fn expense(amount: impl Into<String>) -> Self {
        Self::new(Direction::Out, amount)
    }

    fn new(direction: Direction, amount: impl Into<String>) -> Self {
        Self {
            rule: RawRule {
                direction,
                amount: amount.into(),
                ..Default::default()
            },
        }
    }

    // =========================================================================
    // Timing
    // =========================================================================

    /// First occurrence
    #[must_use]
    pub fn on(self, day: i8, month: i8, year: i16) -> Self {
        self.day_month(day, month).year(year)
    }

    /// Anchor day and month without a year
    #[must_use]
    pub fn day_month(mut self, day: i8, month: i8) -> Self {
        self.rule.date_str = format!("{day}.{month}");
        self
    }

    #[must_use]
    pub fn year(mut self, year: i16) -> Self {
        self.rule.year = year.to_string();
        self
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.rule.frequency = frequency;
        self
    }

    #[must_use]
    pub fn once(self) -> Self {
        self.frequency(Frequency::OneTime)
    }

    #[must_use]
    pub fn monthly(self) -> Self {
        self.frequency(Frequency::Monthly)
    }

    #[must_use]
    pub fn quarterly(self) -> Self {
        self.frequency(Frequency::Quarterly)
    }

    #[must_use]
    pub fn yearly(self) -> Self {
        self.frequency(Frequency::Yearly)
    }

    /// Last day the rule fires, `YYYY-MM-DD`
    #[must_use]
    pub fn until(mut self, end_date: &str) -> Self {
        self.rule.end_date = end_date.to_string();
        self
    }

    // =========================================================================
    // Spreading
    // =========================================================================

    #[must_use]
    pub fn effective(mut self, effective: Effective) -> Self {
        self.rule.effective = effective;
        self
    }

    #[must_use]
    pub fn spread_month(self) -> Self {
        self.effective(Effective::SpreadMonth)
    }

    #[must_use]
    pub fn spread_quarter(self) -> Self {
        self.effective(Effective::SpreadQuarter)
    }

    #[must_use]
    pub fn spread_year(self) -> Self {
        self.effective(Effective::SpreadYear)
    }

    // =========================================================================
    // Labels and escalation
    // =========================================================================

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.rule.labels.push(label.into());
        self
    }

    #[must_use]
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Grow by `percent` every `every` units
    #[must_use]
    pub fn escalate(mut self, percent: f64, every: u32, unit: EscalationUnit) -> Self {
        self.rule.escalation_pct = percent.to_string();
        self.rule.escalation_every = every.to_string();
        self.rule.escalation_unit = unit;
        self
    }

    #[must_use]
    pub fn escalate_yearly(self, percent: f64) -> Self {
        self.escalate(percent, 1, EscalationUnit::Year)
    }

    #[must_use]
    pub fn escalate_monthly(self, percent: f64, every: u32) -> Self {
        self.escalate(percent, every, EscalationUnit::Month)
    }

    pub fn build(self) -> RawRule {
        self.rule
    }
}
