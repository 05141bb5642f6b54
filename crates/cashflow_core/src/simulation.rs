//! Simulation driver
//!
//! compile → occurrences (+ escalation) → accumulate → sweep (optional).
//! A run is a pure function of its inputs.

use tracing::debug;

use crate::accumulator::FlowAccumulator;
use crate::compile::compile_rules;
use crate::config::SimulationConfig;
use crate::date_math::month_end_flags;
use crate::error::ConfigError;
use crate::escalation::escalated_amount;
use crate::model::{
    CategoryRegistry, CategorySeries, INVESTMENT, InvestmentProjection, RawRule, SimulationResult,
    SimulationWindow,
};
use crate::money::{CurrencyTable, to_minor_f64};
use crate::occurrences::occurrences;
use crate::sweep::{SweepSettings, apply_sweep};

/// Everything besides the rules that a run needs, already in minor units
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub currency: String,
    pub decimals: u8,
    pub starting_balance: i64,
    /// `None` disables the investment sweep
    pub sweep: Option<SweepSettings>,
}

impl RunSettings {
    pub fn from_config(config: &SimulationConfig, currencies: &CurrencyTable) -> Self {
        let decimals = config.decimals(currencies);
        let min_cash_minor = to_minor_f64(config.invest_min_cash, decimals);
        let sweep = (config.invest_enabled && min_cash_minor > 0).then_some(SweepSettings {
            min_cash_minor,
            annual_rate_pct: config.invest_annual_rate_pct,
        });
        Self {
            currency: config.currency.clone(),
            decimals,
            starting_balance: to_minor_f64(config.start_value, decimals),
            sweep,
        }
    }
}

/// Run a scenario with the default currency table.
///
/// `Ok(None)` when the window is empty; `Err` only for an unusable start date.
pub fn simulate(config: &SimulationConfig) -> Result<Option<SimulationResult>, ConfigError> {
    simulate_with(config, &CurrencyTable::default())
}

/// Run a scenario with a caller-supplied currency table.
pub fn simulate_with(
    config: &SimulationConfig,
    currencies: &CurrencyTable,
) -> Result<Option<SimulationResult>, ConfigError> {
    let Some(window) = config.window()? else {
        debug!(
            start = %config.start_date,
            years = config.timeframe_years,
            "Empty simulation window"
        );
        return Ok(None);
    };
    let settings = RunSettings::from_config(config, currencies);
    Ok(Some(simulate_window(&window, &config.rows, &settings)))
}

/// Run `rules` over `window`.
pub fn simulate_window(
    window: &SimulationWindow,
    rules: &[RawRule],
    settings: &RunSettings,
) -> SimulationResult {
    let total_days = window.total_days();
    let mut registry = CategoryRegistry::new();
    let compiled = compile_rules(rules, window, settings.decimals, &mut registry);

    let mut accumulator = FlowAccumulator::new(total_days, registry.len());
    let mut occurrence_count = 0usize;
    for rule in &compiled.rules {
        for date in occurrences(rule, window) {
            let amount = escalated_amount(rule, date);
            accumulator.apply_occurrence(date, rule.effective, amount, &rule.categories, window);
            occurrence_count += 1;
        }
    }
    let flows = accumulator.finish(settings.starting_balance);

    let mut daily_net = flows.daily_net;
    let mut daily_balance = flows.daily_balance;
    let mut category_net = flows.category_net;

    let investment = settings.sweep.map(|sweep| {
        let month_end = month_end_flags(window.start, total_days);
        let outcome = apply_sweep(
            &daily_net,
            &daily_balance,
            &month_end,
            settings.starting_balance,
            sweep,
        );
        for (net, outflow) in daily_net.iter_mut().zip(&outcome.daily_outflow) {
            *net = net.saturating_add(*outflow);
        }
        daily_balance = outcome.daily_balance;

        // The Investment series is the sweep alone, even when a rule is
        // labelled "Investment" too.
        let id = registry.intern(INVESTMENT);
        if id.index() == category_net.len() {
            category_net.push(outcome.daily_outflow.clone());
        } else {
            category_net[id.index()].clone_from(&outcome.daily_outflow);
        }

        InvestmentProjection {
            min_cash_minor: sweep.min_cash_minor,
            annual_rate_pct: sweep.annual_rate_pct,
            daily_outflow: outcome.daily_outflow,
            daily_balance: outcome.daily_investment,
        }
    });

    debug!(
        days = total_days,
        rules = compiled.rules.len(),
        occurrences = occurrence_count,
        categories = registry.len(),
        investing = investment.is_some(),
        "Simulation complete"
    );

    let categories = registry
        .into_names()
        .into_iter()
        .zip(category_net)
        .map(|(name, daily_net)| CategorySeries { name, daily_net })
        .collect();

    SimulationResult {
        start_date: window.start,
        end_date: window.end,
        currency: settings.currency.clone(),
        decimals: settings.decimals,
        starting_balance: settings.starting_balance,
        daily_net,
        daily_balance,
        categories,
        investment,
        rule_status: compiled.status,
    }
}
