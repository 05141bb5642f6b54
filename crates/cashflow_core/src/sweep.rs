//! Month-end cash sweep into an investment account
//!
//! At every month end the largest amount that keeps both today's balance and
//! every later balance above the cash floor is moved out of cash. The
//! investment balance compounds monthly and only changes at month ends.

use tracing::trace;

use crate::accumulator::running_balance;
use crate::money::round_half_up;

/// Sweep inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSettings {
    /// Cash floor in minor units; the sweep is inactive unless positive
    pub min_cash_minor: i64,
    pub annual_rate_pct: f64,
}

/// Sweep outputs, all indexed by day
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    /// Swept amount as a negative flow
    pub daily_outflow: Vec<i64>,
    /// Investment balance as of the latest month end
    pub daily_investment: Vec<i64>,
    /// Cash balance after sweeping
    pub daily_balance: Vec<i64>,
}

/// `out[i] = min(values[i..])`.
pub fn suffix_min(values: &[i64]) -> Vec<i64> {
    let mut out = vec![0; values.len()];
    let mut current = i64::MAX;
    for (slot, &v) in out.iter_mut().zip(values).rev() {
        current = current.min(v);
        *slot = current;
    }
    out
}

/// Growth factor applied at each month end, `None` when it would be a no-op
/// or the rate is unusable.
pub fn monthly_factor(annual_rate_pct: f64) -> Option<f64> {
    let annual = annual_rate_pct / 100.0;
    if !annual.is_finite() || annual == 0.0 || annual <= -1.0 {
        return None;
    }
    Some((1.0 + annual).powf(1.0 / 12.0))
}

/// Amount swept at each day, zero except on month ends.
///
/// `balance` is the un-swept cash balance.
pub fn sweep_amounts(balance: &[i64], month_end: &[bool], min_cash: i64) -> Vec<i64> {
    let lowest_ahead = suffix_min(balance);
    let mut swept = vec![0; balance.len()];
    let mut invested = 0i64;
    for (i, amount) in swept.iter_mut().enumerate() {
        if !month_end[i] {
            continue;
        }
        let min_future_adjusted = lowest_ahead[i].saturating_sub(invested);
        let adjusted_today = balance[i].saturating_sub(invested);
        let max_here = adjusted_today.saturating_sub(min_cash).max(0);
        let desired = min_future_adjusted.saturating_sub(min_cash).max(0);
        let invest = desired.min(max_here);
        if invest == 0 {
            continue;
        }
        trace!(day = i, amount = invest, "Sweeping surplus cash");
        *amount = invest;
        invested = invested.saturating_add(invest);
    }
    swept
}

/// Investment balance per day: compound, then add the month end's sweep.
pub fn investment_balance(swept: &[i64], month_end: &[bool], annual_rate_pct: f64) -> Vec<i64> {
    let factor = monthly_factor(annual_rate_pct);
    let mut balance = 0i64;
    swept
        .iter()
        .zip(month_end)
        .map(|(&amount, &is_month_end)| {
            if is_month_end {
                if let Some(factor) = factor {
                    balance = round_half_up(balance as f64 * factor) as i64;
                }
                balance = balance.saturating_add(amount);
            }
            balance
        })
        .collect()
}

/// Run the sweep over an un-swept daily series.
///
/// The caller nets `daily_outflow` into its own flow series; the returned
/// balance already reflects it.
pub fn apply_sweep(
    daily_net: &[i64],
    daily_balance: &[i64],
    month_end: &[bool],
    starting_balance: i64,
    settings: SweepSettings,
) -> SweepOutcome {
    let swept = sweep_amounts(daily_balance, month_end, settings.min_cash_minor);
    let daily_outflow: Vec<i64> = swept.iter().map(|&a| -a).collect();
    let net: Vec<i64> = daily_net
        .iter()
        .zip(&daily_outflow)
        .map(|(n, o)| n.saturating_add(*o))
        .collect();
    SweepOutcome {
        daily_balance: running_balance(&net, starting_balance),
        daily_investment: investment_balance(&swept, month_end, settings.annual_rate_pct),
        daily_outflow,
    }
}
