//! Resolution-based aggregation of daily series
//!
//! Days are grouped into calendar buckets. Keys only ever move forward as
//! days are visited in order, so buckets are contiguous day ranges in
//! chronological order.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{add_days, iso_week};
use crate::error::ParseResolutionError;
use crate::model::SimulationResult;
use crate::money::div_round_half_up;

/// Label of the single series used when a run has no categories
pub const NET_FLOW: &str = "Net Flow";

/// Bucket size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Resolution {
    pub const ALL: [Resolution; 5] = [
        Resolution::Daily,
        Resolution::Weekly,
        Resolution::Monthly,
        Resolution::Quarterly,
        Resolution::Yearly,
    ];

    pub fn key(self, date: Date) -> BucketKey {
        match self {
            Resolution::Daily => BucketKey::Day(date),
            Resolution::Weekly => {
                let week = iso_week(date);
                BucketKey::Week {
                    year: week.year,
                    week: week.week,
                }
            }
            Resolution::Monthly => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Resolution::Quarterly => BucketKey::Quarter {
                year: date.year(),
                quarter: (date.month() - 1) / 3 + 1,
            },
            Resolution::Yearly => BucketKey::Year(date.year()),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolution::Daily => "Daily",
            Resolution::Weekly => "Weekly",
            Resolution::Monthly => "Monthly",
            Resolution::Quarterly => "Quarterly",
            Resolution::Yearly => "Yearly",
        };
        f.write_str(name)
    }
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Resolution::Daily),
            "weekly" | "week" | "w" => Ok(Resolution::Weekly),
            "monthly" | "month" | "m" => Ok(Resolution::Monthly),
            "quarterly" | "quarter" | "q" => Ok(Resolution::Quarterly),
            "yearly" | "year" | "y" => Ok(Resolution::Yearly),
            _ => Err(ParseResolutionError(s.to_string())),
        }
    }
}

/// Calendar bucket a day belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BucketKey {
    Day(Date),
    /// ISO week-numbering year and week
    Week { year: i16, week: i8 },
    Month { year: i16, month: i8 },
    Quarter { year: i16, quarter: i8 },
    Year(i16),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(date) => write!(f, "{date}"),
            BucketKey::Week { year, week } => write!(f, "{year}-W{week:02}"),
            BucketKey::Month { year, month } => write!(f, "{year}-{month:02}"),
            BucketKey::Quarter { year, quarter } => write!(f, "{year}-Q{quarter}"),
            BucketKey::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Consecutive day-index ranges sharing a key, in order.
pub fn bucket_ranges(
    start: Date,
    total_days: usize,
    resolution: Resolution,
) -> Vec<(BucketKey, Range<usize>)> {
    let mut ranges: Vec<(BucketKey, Range<usize>)> = Vec::new();
    let mut date = start;
    for i in 0..total_days {
        let key = resolution.key(date);
        match ranges.last_mut() {
            Some((last, range)) if *last == key => range.end = i + 1,
            _ => ranges.push((key, i..i + 1)),
        }
        date = add_days(date, 1);
    }
    ranges
}

/// Flow and balance statistics of one bucket, in minor units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub label: String,
    /// Index of the bucket's first day
    pub first_day: usize,
    pub days: usize,
    pub flow_sum: i64,
    pub cash_in: i64,
    /// Positive total of outflows
    pub cash_out: i64,
    pub min_balance: i64,
    pub max_balance: i64,
    pub avg_balance: i64,
    pub end_balance: i64,
}

fn saturating_sum<'a>(values: impl IntoIterator<Item = &'a i64>) -> i64 {
    values.into_iter().fold(0, |acc, &v| acc.saturating_add(v))
}

/// Aggregate the result's daily net flow and balance.
pub fn bucketize(result: &SimulationResult, resolution: Resolution) -> Vec<Bucket> {
    bucket_ranges(result.start_date, result.total_days(), resolution)
        .into_iter()
        .map(|(key, range)| {
            let net = &result.daily_net[range.clone()];
            let balance = &result.daily_balance[range.clone()];
            let days = range.len();
            let total_balance: i128 = balance.iter().map(|&b| i128::from(b)).sum();
            Bucket {
                key,
                label: key.to_string(),
                first_day: range.start,
                days,
                flow_sum: saturating_sum(net),
                cash_in: saturating_sum(net.iter().filter(|&&n| n > 0)),
                cash_out: saturating_sum(net.iter().filter(|&&n| n < 0)).saturating_neg(),
                min_balance: balance.iter().copied().min().unwrap_or(0),
                max_balance: balance.iter().copied().max().unwrap_or(0),
                avg_balance: div_round_half_up(total_balance, days as i64),
                end_balance: balance.last().copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Per-category flow sums per bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowBreakdown {
    pub labels: Vec<String>,
    /// Sorted case-insensitively
    pub categories: Vec<String>,
    /// `data[category][bucket]`
    pub data: Vec<Vec<i64>>,
}

impl FlowBreakdown {
    pub fn series(&self, category: &str) -> Option<&[i64]> {
        let index = self.categories.iter().position(|c| c == category)?;
        Some(&self.data[index])
    }
}

/// Sum each category's daily flow per bucket. A run without categories
/// reports the total net flow as a single [`NET_FLOW`] series.
pub fn bucketize_flow_by_category(result: &SimulationResult, resolution: Resolution) -> FlowBreakdown {
    let mut series: Vec<(&str, &[i64])> = result
        .categories
        .iter()
        .map(|c| (c.name.as_str(), c.daily_net.as_slice()))
        .collect();
    series.sort_by_cached_key(|(name, _)| name.to_lowercase());
    if series.is_empty() {
        series.push((NET_FLOW, &result.daily_net));
    }

    let ranges = bucket_ranges(result.start_date, result.total_days(), resolution);
    FlowBreakdown {
        labels: ranges.iter().map(|(key, _)| key.to_string()).collect(),
        categories: series.iter().map(|(name, _)| name.to_string()).collect(),
        data: series
            .iter()
            .map(|(_, daily)| {
                ranges
                    .iter()
                    .map(|(_, range)| saturating_sum(&daily[range.clone()]))
                    .collect()
            })
            .collect(),
    }
}

/// Swept amounts and investment value per bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentBuckets {
    pub labels: Vec<String>,
    /// Cash moved into the investment during the bucket
    pub invested: Vec<i64>,
    /// Investment balance on the bucket's last day
    pub value_end: Vec<i64>,
}

/// `None` when the run did not invest.
pub fn bucketize_investment(
    result: &SimulationResult,
    resolution: Resolution,
) -> Option<InvestmentBuckets> {
    let investment = result.investment.as_ref()?;
    let ranges = bucket_ranges(result.start_date, result.total_days(), resolution);
    Some(InvestmentBuckets {
        labels: ranges.iter().map(|(key, _)| key.to_string()).collect(),
        invested: ranges
            .iter()
            .map(|(_, range)| {
                investment.daily_outflow[range.clone()]
                    .iter()
                    .map(|&o| o.saturating_neg().max(0))
                    .fold(0, i64::saturating_add)
            })
            .collect(),
        value_end: ranges
            .iter()
            .map(|(_, range)| investment.daily_balance[range.end - 1])
            .collect(),
    })
}
