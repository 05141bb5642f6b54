//! Scenario configuration
//!
//! [`SimulationConfig`] is the whole editable state: the window descriptor
//! and the ordered rule list. It round-trips through the camelCase JSON shape
//! used by saved scenarios, and loading tolerates older or partial shapes by
//! defaulting missing fields.
//!
//! # Builder DSL
//!
//! ```ignore
//! use cashflow_core::config::{RuleBuilder, ScenarioBuilder};
//!
//! let config = ScenarioBuilder::new()
//!     .start(2024, 1, 1)
//!     .years(2)
//!     .starting_balance(5_000.0)
//!     .currency("USD")
//!     .rule(RuleBuilder::income("3200").on(25, 1, 2024).label("Salary"))
//!     .rule(RuleBuilder::expense("1450").on(1, 1, 2024).label("Rent").escalate_yearly(3.0))
//!     .invest(10_000.0, 4.5)
//!     .build();
//! ```

use std::cmp::Ordering;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::bucket::Resolution;
use crate::compile::{infer_year, parse_day_month, parse_iso_date};
use crate::date_math::{MIN_DATE, day_index};
use crate::error::ConfigError;
use crate::model::{Direction, RawRule, SimulationWindow};
use crate::money::CurrencyTable;

mod builder;
mod rule_builder;

pub use builder::ScenarioBuilder;
pub use rule_builder::RuleBuilder;

fn default_timeframe_years() -> i32 {
    1
}

fn default_currency() -> String {
    "HKD".to_string()
}

/// Window descriptor plus rules, as saved and shared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: String,
    #[serde(default = "default_timeframe_years")]
    pub timeframe_years: i32,
    /// Opening balance in major units
    #[serde(default)]
    pub start_value: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub invest_enabled: bool,
    /// Cash floor in major units
    #[serde(default)]
    pub invest_min_cash: f64,
    #[serde(default)]
    pub invest_annual_rate_pct: f64,
    #[serde(default)]
    pub rows: Vec<RawRule>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: String::new(),
            timeframe_years: default_timeframe_years(),
            start_value: 0.0,
            currency: default_currency(),
            resolution: Resolution::default(),
            invest_enabled: false,
            invest_min_cash: 0.0,
            invest_annual_rate_pct: 0.0,
            rows: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Parse saved JSON. A full export (`{"state": {...}, "outputs": ...}`) is
    /// accepted as well as the bare state.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Like [`from_json`](Self::from_json) for an already parsed document.
    pub fn from_value(mut value: serde_json::Value) -> Result<Self, ConfigError> {
        if let Some(state) = value.get_mut("state")
            && state.is_object()
        {
            value = state.take();
        }
        let mut config: Self = serde_json::from_value(value)?;
        config.normalize();
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bring loaded state into a consistent shape.
    pub fn normalize(&mut self) {
        self.currency = self.currency.trim().to_ascii_uppercase();
        if self.currency.is_empty() {
            self.currency = default_currency();
        }
        for value in [
            &mut self.start_value,
            &mut self.invest_min_cash,
            &mut self.invest_annual_rate_pct,
        ] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
        for rule in &mut self.rows {
            rule.normalize();
        }
    }

    pub fn start(&self) -> Result<Date, ConfigError> {
        parse_iso_date(&self.start_date)
            .ok_or_else(|| ConfigError::InvalidStartDate(self.start_date.clone()))
    }

    /// The simulated window, `Ok(None)` when it is empty.
    pub fn window(&self) -> Result<Option<SimulationWindow>, ConfigError> {
        Ok(SimulationWindow::new(self.start()?, self.timeframe_years))
    }

    pub fn decimals(&self, currencies: &CurrencyTable) -> u8 {
        currencies.decimals(&self.currency)
    }

    /// Keep exactly one empty rule at the end of the list for editing.
    pub fn ensure_trailing_empty_rule(&mut self) {
        while self.rows.len() > 1
            && self.rows[self.rows.len() - 1].is_empty()
            && self.rows[self.rows.len() - 2].is_empty()
        {
            self.rows.pop();
        }
        if self.rows.last().is_none_or(|rule| !rule.is_empty()) {
            self.rows.push(RawRule::default());
        }
    }

    /// Fill blank years of rules that have a day-month, using the first year
    /// the date falls on or after the start. Returns how many were filled.
    pub fn fill_missing_years(&mut self) -> Result<usize, ConfigError> {
        let start = self.start()?;
        let mut filled = 0;
        for rule in &mut self.rows {
            if !rule.year.trim().is_empty() {
                continue;
            }
            if let Some((day, month)) = parse_day_month(&rule.date_str) {
                rule.year = infer_year(start, day, month).to_string();
                filled += 1;
            }
        }
        Ok(filled)
    }

    /// Sort the non-empty rules by `key` (stable), then restore the trailing
    /// empty rule.
    pub fn sort_rules(&mut self, key: SortKey, ascending: bool) {
        let mut rules: Vec<RawRule> = self.rows.drain(..).filter(|r| !r.is_empty()).collect();
        rules.sort_by(|a, b| {
            let ordering = key.value(a).compare(&key.value(b));
            if ascending { ordering } else { ordering.reverse() }
        });
        self.rows = rules;
        self.ensure_trailing_empty_rule();
    }
}

/// Column a rule list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Amount,
    Year,
    Direction,
    Frequency,
    Effective,
    Labels,
    Date,
}

enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

fn number_or_zero(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

impl SortKey {
    fn value(self, rule: &RawRule) -> SortValue {
        match self {
            SortKey::Amount => SortValue::Number(number_or_zero(&rule.amount)),
            SortKey::Year => SortValue::Number(number_or_zero(&rule.year)),
            SortKey::Direction => SortValue::Number(match rule.direction {
                Direction::In => 0.0,
                Direction::Out => 1.0,
            }),
            SortKey::Frequency => SortValue::Text(rule.frequency.label().to_string()),
            SortKey::Effective => SortValue::Text(rule.effective.label().to_string()),
            SortKey::Labels => SortValue::Text(rule.labels.join(", ")),
            // Rules without a usable date sort last
            SortKey::Date => {
                let date = parse_day_month(&rule.date_str).and_then(|(day, month)| {
                    let year: i16 = rule.year.trim().parse().ok()?;
                    Date::new(year, month, day).ok()
                });
                SortValue::Number(date.map_or(f64::INFINITY, |d| day_index(MIN_DATE, d) as f64))
            }
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amount" => Ok(SortKey::Amount),
            "year" => Ok(SortKey::Year),
            "direction" => Ok(SortKey::Direction),
            "frequency" => Ok(SortKey::Frequency),
            "effective" => Ok(SortKey::Effective),
            "labels" => Ok(SortKey::Labels),
            "date" => Ok(SortKey::Date),
            other => Err(format!("unknown sort key {other:?}")),
        }
    }
}
