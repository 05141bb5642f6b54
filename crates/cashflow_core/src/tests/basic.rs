//! End-to-end scenarios
//!
//! These tests verify:
//! - A plain monthly income lands on the 1st of every month
//! - Rule statuses are reported per input rule without aborting the run
//! - Empty windows and bad start dates are handled

use jiff::civil::date;

use crate::bucket::{Resolution, bucketize};
use crate::config::{RuleBuilder, ScenarioBuilder, SimulationConfig};
use crate::error::{ConfigError, RuleError};
use crate::model::{Direction, RuleStatus, UNCATEGORIZED};
use crate::simulation::simulate;

#[test]
fn test_monthly_income_end_to_end() {
    let config = ScenarioBuilder::new()
        .start(2024, 1, 1)
        .years(1)
        .currency("HKD")
        .rule(RuleBuilder::income("1200.00").on(1, 1, 2024).monthly())
        .build();

    let result = simulate(&config).unwrap().unwrap();
    assert_eq!(result.start_date, date(2024, 1, 1));
    assert_eq!(result.end_date, date(2025, 1, 1));
    assert_eq!(result.total_days(), 366);

    let buckets = bucketize(&result, Resolution::Monthly);
    assert_eq!(buckets.len(), 12);
    for bucket in &buckets {
        let first_day = bucket.first_day;
        assert_eq!(result.daily_net[first_day], 120_000, "{}", bucket.label);
        assert_eq!(bucket.flow_sum, 120_000, "{}", bucket.label);
        assert_eq!(bucket.cash_in, 120_000);
        assert_eq!(bucket.cash_out, 0);
    }
    assert_eq!(result.final_balance(), 1_440_000);
    assert_eq!(buckets.last().unwrap().end_balance, 1_440_000);
    assert_eq!(result.daily_net.iter().filter(|&&n| n != 0).count(), 12);

    let category = result.category(UNCATEGORIZED).unwrap();
    assert_eq!(category.daily_net, result.daily_net);
}

#[test]
fn test_starting_balance_and_expense() {
    let config = ScenarioBuilder::new()
        .start(2024, 1, 1)
        .years(1)
        .starting_balance(500.0)
        .rule(RuleBuilder::expense("100").on(15, 1, 2024).quarterly())
        .build();
    let result = simulate(&config).unwrap().unwrap();
    assert_eq!(result.starting_balance, 50_000);
    assert_eq!(result.daily_balance[0], 50_000);
    assert_eq!(result.final_balance(), 10_000);

    let transactions = result.transactions();
    let dates: Vec<_> = transactions.iter().map(|t| t.date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 1, 15), date(2024, 4, 15), date(2024, 7, 15), date(2024, 10, 15)]
    );
    assert!(transactions.iter().all(|t| t.direction == Direction::Out));
    assert_eq!(transactions[3].balance_minor, 10_000);
}

#[test]
fn test_statuses_reported_in_input_order() {
    let mut config = ScenarioBuilder::new()
        .start(2024, 1, 1)
        .rule(RuleBuilder::income("10").on(1, 1, 2024))
        .rule(RuleBuilder::income("10").day_month(31, 4).year(2024))
        .rule(RuleBuilder::income("10").day_month(1, 1))
        .rule(RuleBuilder::income("0").on(1, 1, 2024))
        .build();
    config.rows[0].end_date = "31/12/2024".into();

    let result = simulate(&config).unwrap().unwrap();
    assert_eq!(
        result.rule_status,
        vec![
            RuleStatus::Invalid(RuleError::MalformedEndDate("31/12/2024".into())),
            RuleStatus::Invalid(RuleError::DayOutOfRange {
                day: 31,
                month: 4,
                year: 2024
            }),
            RuleStatus::Invalid(RuleError::MissingYear(String::new())),
            RuleStatus::Valid,
            RuleStatus::Empty,
        ]
    );
    assert_eq!(result.invalid_rule_count(), 3);
    assert!(result.daily_net.iter().all(|&n| n == 0));
    assert!(result.categories.is_empty());
}

#[test]
fn test_rule_before_window_fast_forwards() {
    let config = ScenarioBuilder::new()
        .start(2024, 3, 10)
        .years(1)
        .rule(RuleBuilder::income("1").on(31, 1, 2020).monthly())
        .build();
    let result = simulate(&config).unwrap().unwrap();
    let dates: Vec<_> = result.transactions().iter().map(|t| t.date).collect();
    assert_eq!(dates.first(), Some(&date(2024, 3, 31)));
    assert_eq!(dates.last(), Some(&date(2025, 2, 28)));
    assert_eq!(dates.len(), 12);
}

#[test]
fn test_one_time_and_end_date() {
    let config = ScenarioBuilder::new()
        .start(2024, 1, 1)
        .years(2)
        .rule(RuleBuilder::income("5000").on(20, 6, 2024).once())
        .rule(
            RuleBuilder::expense("10")
                .on(1, 1, 2024)
                .until("2024-03-01"),
        )
        .build();
    let result = simulate(&config).unwrap().unwrap();
    let transactions = result.transactions();
    let dates: Vec<_> = transactions.iter().map(|t| t.date).collect();
    // The end date is inclusive
    assert_eq!(
        dates,
        vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1), date(2024, 6, 20)]
    );
    assert_eq!(result.final_balance(), 500_000 - 3_000);
}

#[test]
fn test_empty_window_yields_nothing() {
    let config = ScenarioBuilder::new()
        .start(2024, 1, 1)
        .years(0)
        .rule(RuleBuilder::income("1").on(1, 1, 2024))
        .build();
    assert!(simulate(&config).unwrap().is_none());
}

#[test]
fn test_bad_start_date_is_an_error() {
    let config = SimulationConfig {
        start_date: String::new(),
        ..Default::default()
    };
    assert!(matches!(simulate(&config), Err(ConfigError::InvalidStartDate(_))));
}

#[test]
fn test_zero_decimal_currency() {
    let config = ScenarioBuilder::new()
        .start(2024, 1, 1)
        .currency("JPY")
        .starting_balance(1000.4)
        .rule(RuleBuilder::income("1500.5").on(1, 1, 2024).once())
        .build();
    let result = simulate(&config).unwrap().unwrap();
    assert_eq!(result.decimals, 0);
    assert_eq!(result.starting_balance, 1000);
    assert_eq!(result.final_balance(), 1000 + 1501);
}
