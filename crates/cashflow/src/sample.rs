//! Starter scenario written by `cashflow init`

use cashflow_core::date_math::add_months_clamped;
use cashflow_core::model::Effective;
use cashflow_core::{ConfigError, Resolution, RuleBuilder, ScenarioBuilder, SimulationConfig};
use jiff::civil::Date;

/// A two-year household plan starting on `today`. Recurring rules carry only
/// a day and month; their years are inferred from the start date.
pub fn sample_scenario(today: Date) -> Result<SimulationConfig, ConfigError> {
    let month = today.month();
    let next_month = add_months_clamped(today, 1, None);
    let next_quarter = add_months_clamped(today, 3, None);
    let holiday = add_months_clamped(today, 6, None);

    let mut config = ScenarioBuilder::new()
        .start_date(today)
        .years(2)
        .starting_balance(8_000.0)
        .currency("HKD")
        .resolution(Resolution::Monthly)
        .rule(RuleBuilder::income("42000").day_month(25, month).label("Salary"))
        .rule(
            RuleBuilder::expense("18500")
                .day_month(1, next_month.month())
                .label("Housing")
                .escalate_yearly(3.0),
        )
        .rule(
            RuleBuilder::expense("1200")
                .day_month(1, next_quarter.month())
                .quarterly()
                .effective(Effective::SpreadQuarter)
                .labels(["Utilities", "Housing"]),
        )
        .rule(
            RuleBuilder::expense("6400")
                .day_month(today.day(), month)
                .yearly()
                .spread_year()
                .label("Insurance"),
        )
        .rule(
            RuleBuilder::expense("15000")
                .on(holiday.day(), holiday.month(), holiday.year())
                .once()
                .label("Travel"),
        )
        .invest(20_000.0, 4.0)
        .build();

    config.fill_missing_years()?;
    Ok(config)
}
