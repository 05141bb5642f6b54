//! Scenario Builder DSL
//!
//! Fluent construction of a [`SimulationConfig`], mostly for tests, benches
//! and sample scenarios.

use jiff::civil::Date;

use super::SimulationConfig;
use super::rule_builder::RuleBuilder;
use crate::bucket::Resolution;

/// Builder for a complete scenario
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    config: SimulationConfig,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }

    // =========================================================================
    // Window
    // =========================================================================

    /// Set the simulation start date
    #[must_use]
    pub fn start_date(mut self, date: Date) -> Self {
        self.config.start_date = date.to_string();
        self
    }

    /// Set the simulation start date (convenience method)
    #[must_use]
    pub fn start(self, year: i16, month: i8, day: i8) -> Self {
        self.start_date(jiff::civil::date(year, month, day))
    }

    #[must_use]
    pub fn years(mut self, years: i32) -> Self {
        self.config.timeframe_years = years;
        self
    }

    /// Opening balance in major units
    #[must_use]
    pub fn starting_balance(mut self, amount: f64) -> Self {
        self.config.start_value = amount;
        self
    }

    #[must_use]
    pub fn currency(mut self, code: &str) -> Self {
        self.config.currency = code.to_ascii_uppercase();
        self
    }

    #[must_use]
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.config.resolution = resolution;
        self
    }

    // =========================================================================
    // Rules and investing
    // =========================================================================

    #[must_use]
    pub fn rule(mut self, rule: RuleBuilder) -> Self {
        self.config.rows.push(rule.build());
        self
    }

    /// Sweep cash above `min_cash` (major units) into an investment growing at
    /// `annual_rate_pct`.
    #[must_use]
    pub fn invest(mut self, min_cash: f64, annual_rate_pct: f64) -> Self {
        self.config.invest_enabled = true;
        self.config.invest_min_cash = min_cash;
        self.config.invest_annual_rate_pct = annual_rate_pct;
        self
    }

    /// Finish with the trailing empty rule an editor expects.
    pub fn build(mut self) -> SimulationConfig {
        self.config.ensure_trailing_empty_rule();
        self.config
    }
}
