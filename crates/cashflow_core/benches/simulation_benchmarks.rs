//! Criterion benchmarks for cashflow_core simulation
//!
//! Run with: cargo bench -p cashflow_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use cashflow_core::config::{RuleBuilder, ScenarioBuilder, SimulationConfig};
use cashflow_core::{Resolution, bucketize, bucketize_flow_by_category, simulate};

fn create_household_config(years: i32) -> SimulationConfig {
    ScenarioBuilder::new()
        .start(2025, 1, 1)
        .years(years)
        .starting_balance(5_000.0)
        .rule(RuleBuilder::income("4200").on(25, 1, 2025).label("Salary").escalate_yearly(2.0))
        .rule(RuleBuilder::expense("1650").on(1, 1, 2025).label("Rent").escalate_yearly(3.0))
        .rule(
            RuleBuilder::expense("950")
                .on(31, 1, 2025)
                .spread_month()
                .labels(["Groceries", "Household"]),
        )
        .rule(
            RuleBuilder::expense("1200")
                .on(15, 3, 2025)
                .yearly()
                .spread_year()
                .label("Insurance"),
        )
        .rule(
            RuleBuilder::expense("420")
                .on(10, 2, 2025)
                .quarterly()
                .spread_quarter()
                .label("Utilities"),
        )
        .rule(RuleBuilder::income("3000").on(15, 12, 2025).yearly().label("Bonus"))
        .build()
}

/// Many labelled rules to stress per-category accumulation
fn create_many_rules_config(rules: usize) -> SimulationConfig {
    let mut builder = ScenarioBuilder::new().start(2025, 1, 1).years(10);
    for i in 0..rules {
        let day = (i % 28 + 1) as i8;
        let rule = RuleBuilder::expense(format!("{}.{:02}", 10 + i, i % 100))
            .on(day, 1, 2025)
            .label(format!("Category {}", i % 20))
            .spread_month();
        builder = builder.rule(rule);
    }
    builder.build()
}

fn bench_household(c: &mut Criterion) {
    let config = create_household_config(30);

    c.bench_function("household_30yr_simulation", |b| {
        b.iter(|| simulate(black_box(&config)))
    });
}

fn bench_household_with_sweep(c: &mut Criterion) {
    let mut config = create_household_config(30);
    config.invest_enabled = true;
    config.invest_min_cash = 10_000.0;
    config.invest_annual_rate_pct = 5.0;

    c.bench_function("household_30yr_with_sweep", |b| {
        b.iter(|| simulate(black_box(&config)))
    });
}

fn bench_rule_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_count");

    for rules in [10, 100, 500].iter() {
        let config = create_many_rules_config(*rules);
        group.bench_with_input(BenchmarkId::new("rules", rules), rules, |b, _| {
            b.iter(|| simulate(black_box(&config)))
        });
    }

    group.finish();
}

fn bench_bucketize(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucketize");
    let config = create_household_config(30);
    let Ok(Some(result)) = simulate(&config) else {
        panic!("benchmark scenario must produce a result");
    };

    for resolution in Resolution::ALL {
        group.bench_function(resolution.to_string(), |b| {
            b.iter(|| bucketize(black_box(&result), black_box(resolution)))
        });
    }
    group.bench_function("flow_by_category_monthly", |b| {
        b.iter(|| bucketize_flow_by_category(black_box(&result), black_box(Resolution::Monthly)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_household,
    bench_household_with_sweep,
    bench_rule_count,
    bench_bucketize,
);
criterion_main!(benches);
