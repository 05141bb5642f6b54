//! Headline figures of a run

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::model::SimulationResult;

/// A balance and the first day it is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedBalance {
    pub date: Date,
    pub balance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub end: DatedBalance,
    pub max: DatedBalance,
    pub min: DatedBalance,
    /// Highest investment balance, when the run invested
    pub peak_investment: Option<DatedBalance>,
    pub total_in: i64,
    pub total_out: i64,
}

/// Earliest index of the extreme value selected by `better`.
fn extreme(values: &[i64], better: impl Fn(i64, i64) -> bool) -> Option<(usize, i64)> {
    let (first, rest) = values.split_first()?;
    let mut best = (0, *first);
    for (i, &v) in rest.iter().enumerate() {
        if better(v, best.1) {
            best = (i + 1, v);
        }
    }
    Some(best)
}

impl BalanceSummary {
    /// `None` for a run with no days.
    pub fn from_result(result: &SimulationResult) -> Option<Self> {
        let balance = &result.daily_balance;
        let at = |(i, balance): (usize, i64)| DatedBalance {
            date: result.date_at(i),
            balance,
        };
        let last = balance.len().checked_sub(1)?;
        Some(Self {
            end: at((last, balance[last])),
            max: at(extreme(balance, |a, b| a > b)?),
            min: at(extreme(balance, |a, b| a < b)?),
            peak_investment: result
                .investment
                .as_ref()
                .and_then(|inv| extreme(&inv.daily_balance, |a, b| a > b))
                .map(at),
            total_in: result
                .daily_net
                .iter()
                .filter(|&&n| n > 0)
                .fold(0, |acc, &n| acc.saturating_add(n)),
            total_out: result
                .daily_net
                .iter()
                .filter(|&&n| n < 0)
                .fold(0, |acc, &n| acc.saturating_sub(n)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InvestmentProjection;
    use jiff::civil::date;

    fn result(daily_balance: Vec<i64>) -> SimulationResult {
        let mut previous = 0;
        let daily_net = daily_balance
            .iter()
            .map(|&b| {
                let n = b - previous;
                previous = b;
                n
            })
            .collect();
        SimulationResult {
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 1),
            currency: "USD".into(),
            decimals: 2,
            starting_balance: 0,
            daily_net,
            daily_balance,
            categories: Vec::new(),
            investment: None,
            rule_status: Vec::new(),
        }
    }

    #[test]
    fn test_extremes_take_first_day() {
        let summary = BalanceSummary::from_result(&result(vec![10, 30, 5, 30, 5, 20])).unwrap();
        assert_eq!(summary.end, DatedBalance { date: date(2024, 3, 6), balance: 20 });
        assert_eq!(summary.max, DatedBalance { date: date(2024, 3, 2), balance: 30 });
        assert_eq!(summary.min, DatedBalance { date: date(2024, 3, 3), balance: 5 });
        assert_eq!(summary.total_in, 10 + 20 + 25 + 15);
        assert_eq!(summary.total_out, 25 + 25);
        assert!(summary.peak_investment.is_none());
    }

    #[test]
    fn test_peak_investment() {
        let mut r = result(vec![1, 1, 1]);
        r.investment = Some(InvestmentProjection {
            min_cash_minor: 1,
            annual_rate_pct: 0.0,
            daily_outflow: vec![0, 0, 0],
            daily_balance: vec![0, 7, 7],
        });
        let summary = BalanceSummary::from_result(&r).unwrap();
        assert_eq!(summary.peak_investment, Some(DatedBalance { date: date(2024, 3, 2), balance: 7 }));
    }

    #[test]
    fn test_empty_run() {
        assert!(BalanceSummary::from_result(&result(Vec::new())).is_none());
    }
}
