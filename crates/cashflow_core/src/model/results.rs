//! Simulation results
//!
//! Dense per-day series produced by a single run, plus the derived
//! transaction list.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::rules::{Direction, RuleStatus};
use crate::date_math::add_days;

/// Daily net flow of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub name: String,
    pub daily_net: Vec<i64>,
}

/// Cash swept into the investment account and its compounded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentProjection {
    /// Cash floor in minor units
    pub min_cash_minor: i64,
    pub annual_rate_pct: f64,
    /// Swept amount per day as a negative flow, zero on non-sweep days
    pub daily_outflow: Vec<i64>,
    /// Investment balance as of the latest month end
    pub daily_balance: Vec<i64>,
}

impl InvestmentProjection {
    /// Total amount moved out of cash over the window.
    pub fn total_invested(&self) -> i64 {
        self.daily_outflow
            .iter()
            .fold(0i64, |acc, &o| acc.saturating_sub(o))
    }

    pub fn final_balance(&self) -> i64 {
        self.daily_balance.last().copied().unwrap_or(0)
    }
}

/// One day with a non-zero net flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: Date,
    pub direction: Direction,
    /// Absolute net flow of the day in minor units
    pub amount_minor: i64,
    /// Balance at the end of the day
    pub balance_minor: i64,
}

/// Output of a single simulation run
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub start_date: Date,
    /// Exclusive
    pub end_date: Date,
    pub currency: String,
    pub decimals: u8,
    pub starting_balance: i64,
    pub daily_net: Vec<i64>,
    pub daily_balance: Vec<i64>,
    /// Per-category net flow in registry order; sums to `daily_net` over each
    /// occurrence, and every day for immediate rules
    pub categories: Vec<CategorySeries>,
    pub investment: Option<InvestmentProjection>,
    /// One status per input rule, in input order
    pub rule_status: Vec<RuleStatus>,
}

impl SimulationResult {
    pub fn total_days(&self) -> usize {
        self.daily_net.len()
    }

    pub fn date_at(&self, index: usize) -> Date {
        add_days(self.start_date, index as i32)
    }

    pub fn category(&self, name: &str) -> Option<&CategorySeries> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn final_balance(&self) -> i64 {
        self.daily_balance
            .last()
            .copied()
            .unwrap_or(self.starting_balance)
    }

    pub fn invalid_rule_count(&self) -> usize {
        self.rule_status.iter().filter(|s| s.is_invalid()).count()
    }

    /// Days with a non-zero net flow, in date order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.daily_net
            .iter()
            .zip(&self.daily_balance)
            .enumerate()
            .filter(|(_, (net, _))| **net != 0)
            .map(|(i, (&net, &balance))| Transaction {
                date: self.date_at(i),
                direction: if net >= 0 { Direction::In } else { Direction::Out },
                amount_minor: net.saturating_abs(),
                balance_minor: balance,
            })
            .collect()
    }
}
