//! Daily flow accumulation
//!
//! Every occurrence is a range update on a difference array: `+v` where the
//! effect starts and `-v` one past where it ends. One prefix sum at the end
//! turns the array into a per-day net flow, so the cost per occurrence does
//! not depend on how many days it is spread over.
//!
//! All accumulation saturates at the `i64` bounds instead of overflowing.

use jiff::civil::Date;

use crate::date_math::day_index;
use crate::model::{CategoryId, Effective, SimulationWindow};

/// Difference array over `total_days` days.
#[derive(Debug, Clone)]
pub struct DiffArray {
    diff: Vec<i64>,
}

impl DiffArray {
    pub fn new(total_days: usize) -> Self {
        Self {
            diff: vec![0; total_days + 1],
        }
    }

    /// Add `amount` to every day in `[start, end)`.
    #[inline]
    pub fn add_range(&mut self, start: usize, end: usize, amount: i64) {
        debug_assert!(start <= end && end < self.diff.len());
        self.diff[start] = self.diff[start].saturating_add(amount);
        self.diff[end] = self.diff[end].saturating_sub(amount);
    }

    /// Spread `amount` over `span`: the truncated share on every day, then the
    /// remainder one unit at a time on the leading days.
    pub fn add_spread(&mut self, span: DaySpan, amount: i64) {
        let n = span.len as i64;
        let base = amount / n;
        let remainder = amount - base * n;
        self.add_range(span.start, span.start + span.len, base);
        if remainder != 0 {
            let lead = remainder.unsigned_abs() as usize;
            self.add_range(span.start, span.start + lead, remainder.signum());
        }
    }

    /// Per-day values.
    pub fn prefix_sums(&self) -> Vec<i64> {
        let days = self.diff.len() - 1;
        self.diff[..days]
            .iter()
            .scan(0i64, |running, d| {
                *running = running.saturating_add(*d);
                Some(*running)
            })
            .collect()
    }
}

/// Contiguous run of day indexes affected by one occurrence, never empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub start: usize,
    pub len: usize,
}

impl DaySpan {
    /// Days an occurrence on `date` covers, cut off at the window end.
    /// `None` when `date` lies outside the window.
    pub fn of_occurrence(date: Date, effective: Effective, window: &SimulationWindow) -> Option<Self> {
        if !window.contains(date) {
            return None;
        }
        let start = day_index(window.start, date) as usize;
        let len = match effective.spread_end(date) {
            None => 1,
            Some(end) => {
                let end = day_index(window.start, end.min(window.end)) as usize;
                end.saturating_sub(start).max(1)
            }
        };
        Some(Self { start, len })
    }
}

/// Split `amount` into `parts` shares that sum to it exactly. Shares are the
/// truncated quotient; the remainder goes one unit at a time to the leading
/// shares, in the remainder's direction.
pub fn split_amount_minor(amount: i64, parts: usize) -> Vec<i64> {
    let n = parts.max(1);
    if n == 1 {
        return vec![amount];
    }
    let base = amount / n as i64;
    let remainder = amount - base * n as i64;
    let mut out = vec![base; n];
    let step = remainder.signum();
    for share in out.iter_mut().take(remainder.unsigned_abs() as usize) {
        *share += step;
    }
    out
}

/// Materialized daily series
#[derive(Debug, Clone, PartialEq)]
pub struct DailyFlows {
    pub daily_net: Vec<i64>,
    pub daily_balance: Vec<i64>,
    /// Indexed by [`CategoryId`]
    pub category_net: Vec<Vec<i64>>,
}

/// Total and per-category difference arrays for one run.
#[derive(Debug, Clone)]
pub struct FlowAccumulator {
    total: DiffArray,
    categories: Vec<DiffArray>,
}

impl FlowAccumulator {
    pub fn new(total_days: usize, category_count: usize) -> Self {
        Self {
            total: DiffArray::new(total_days),
            categories: (0..category_count)
                .map(|_| DiffArray::new(total_days))
                .collect(),
        }
    }

    /// Record one occurrence of `amount` shared between `categories`.
    ///
    /// The whole amount is spread once on the total. Each category spreads
    /// only its own share, so for multi-day spreads the categories match the
    /// total over the occurrence but not necessarily day by day.
    pub fn apply_occurrence(
        &mut self,
        date: Date,
        effective: Effective,
        amount: i64,
        categories: &[CategoryId],
        window: &SimulationWindow,
    ) {
        let Some(span) = DaySpan::of_occurrence(date, effective, window) else {
            return;
        };
        self.total.add_spread(span, amount);
        let shares = split_amount_minor(amount, categories.len());
        for (&category, share) in categories.iter().zip(shares) {
            if share != 0 {
                self.categories[category.index()].add_spread(span, share);
            }
        }
    }

    pub fn finish(self, starting_balance: i64) -> DailyFlows {
        let daily_net = self.total.prefix_sums();
        let daily_balance = running_balance(&daily_net, starting_balance);
        DailyFlows {
            daily_net,
            daily_balance,
            category_net: self.categories.iter().map(DiffArray::prefix_sums).collect(),
        }
    }
}

/// Balance at the end of each day.
pub fn running_balance(daily_net: &[i64], starting_balance: i64) -> Vec<i64> {
    daily_net
        .iter()
        .scan(starting_balance, |balance, net| {
            *balance = balance.saturating_add(*net);
            Some(*balance)
        })
        .collect()
}
