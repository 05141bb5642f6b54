//! Text, CSV and JSON renderings of a simulation run

use std::io::Write;

use cashflow_core::model::{Direction, RuleStatus, SimulationResult};
use cashflow_core::money::minor_to_decimal_string;
use cashflow_core::{
    BalanceSummary, Resolution, SimulationConfig, bucketize, bucketize_flow_by_category,
    bucketize_investment,
};
use cashflow_core::{Bucket, FlowBreakdown};
use jiff::Timestamp;
use jiff::civil::Date;
use serde::Serialize;

use crate::util::format::{TextTable, format_money, format_money_with_code, format_percentage};

/// Header of the transactions CSV
pub const TRANSACTIONS_HEADER: [&str; 4] = ["date", "in/out", "amount", "resulting_balance"];

fn day_month_year(date: Date) -> String {
    date.strftime("%d.%m.%Y").to_string()
}

/// Headline figures, invalid rules and the lowest cash point.
pub fn summary_text(config: &SimulationConfig, result: &SimulationResult) -> String {
    let money = |minor: i64| format_money_with_code(minor, result.decimals, &result.currency);
    let mut out = String::new();

    out.push_str(&format!(
        "Window: {} to {} ({} days)\n",
        result.start_date,
        result.end_date,
        result.total_days()
    ));
    out.push_str(&format!("Starting balance: {}\n", money(result.starting_balance)));

    if let Some(summary) = BalanceSummary::from_result(result) {
        out.push_str(&format!("Total in:  {}\n", money(summary.total_in)));
        out.push_str(&format!("Total out: {}\n", money(summary.total_out)));
        out.push_str(&format!(
            "End balance: {} on {}\n",
            money(summary.end.balance),
            summary.end.date
        ));
        out.push_str(&format!(
            "Highest balance: {} on {}\n",
            money(summary.max.balance),
            summary.max.date
        ));
        if let Some(peak) = summary.peak_investment {
            out.push_str(&format!(
                "Investment: floor {}, {} per year, peak {} on {}\n",
                money(investment_floor(result)),
                format_percentage(config.invest_annual_rate_pct),
                money(peak.balance),
                peak.date
            ));
        }
        let marker = if summary.min.balance < 0 { "!" } else { "-" };
        out.push_str(&format!(
            "{marker} Lowest cash point: {} ({})\n",
            day_month_year(summary.min.date),
            money(summary.min.balance)
        ));
    }

    let invalid: Vec<(usize, &RuleStatus)> = result
        .rule_status
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_invalid())
        .collect();
    if !invalid.is_empty() {
        out.push_str(&format!("{} invalid rule(s) skipped:\n", invalid.len()));
        for (index, status) in invalid {
            if let Some(error) = status.error() {
                out.push_str(&format!("  rule {}: {}\n", index + 1, error));
            }
        }
    }
    out
}

fn investment_floor(result: &SimulationResult) -> i64 {
    result
        .investment
        .as_ref()
        .map_or(0, |investment| investment.min_cash_minor)
}

/// Balance statistics per bucket.
pub fn bucket_table(buckets: &[Bucket], decimals: u8) -> TextTable {
    let mut table = TextTable::new([
        "Period", "Days", "In", "Out", "Net", "Min", "Max", "Avg", "End",
    ]);
    for bucket in buckets {
        table.push([
            bucket.label.clone(),
            bucket.days.to_string(),
            format_money(bucket.cash_in, decimals),
            format_money(bucket.cash_out, decimals),
            format_money(bucket.flow_sum, decimals),
            format_money(bucket.min_balance, decimals),
            format_money(bucket.max_balance, decimals),
            format_money(bucket.avg_balance, decimals),
            format_money(bucket.end_balance, decimals),
        ]);
    }
    table
}

/// One column per category, one row per bucket.
pub fn category_table(breakdown: &FlowBreakdown, decimals: u8) -> TextTable {
    let headers = std::iter::once("Period".to_string()).chain(breakdown.categories.iter().cloned());
    let mut table = TextTable::new(headers);
    for (bucket, label) in breakdown.labels.iter().enumerate() {
        let cells = std::iter::once(label.clone()).chain(
            breakdown
                .data
                .iter()
                .map(|series| format_money(series[bucket], decimals)),
        );
        table.push(cells);
    }
    table
}

/// Swept cash and investment value per bucket, `None` when nothing was invested.
pub fn investment_table(
    result: &SimulationResult,
    resolution: Resolution,
) -> Option<TextTable> {
    let buckets = bucketize_investment(result, resolution)?;
    let mut table = TextTable::new(["Period", "Invested", "Value"]);
    for ((label, invested), value) in buckets
        .labels
        .iter()
        .zip(&buckets.invested)
        .zip(&buckets.value_end)
    {
        table.push([
            label.clone(),
            format_money(*invested, result.decimals),
            format_money(*value, result.decimals),
        ]);
    }
    Some(table)
}

pub fn transactions_table(result: &SimulationResult) -> TextTable {
    let mut table = TextTable::new(["Date", "In/Out", "Amount", "Balance"]);
    for tx in result.transactions() {
        table.push([
            tx.date.to_string(),
            match tx.direction {
                Direction::In => "In".to_string(),
                Direction::Out => "Out".to_string(),
            },
            format_money(tx.amount_minor, result.decimals),
            format_money(tx.balance_minor, result.decimals),
        ]);
    }
    table
}

/// Write one CSV row per day with a non-zero net flow. Amounts are exact
/// decimal strings in the run's currency precision.
pub fn write_transactions_csv(result: &SimulationResult, writer: impl Write) -> csv::Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(TRANSACTIONS_HEADER)?;
    for tx in result.transactions() {
        csv.write_record([
            tx.date.to_string(),
            tx.direction.to_string(),
            minor_to_decimal_string(tx.amount_minor, result.decimals),
            minor_to_decimal_string(tx.balance_minor, result.decimals),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ExportOutputs {
    pub resolution: Resolution,
    pub buckets: Vec<Bucket>,
    pub flow: FlowBreakdown,
}

/// Scenario state plus the aggregated outputs at its resolution
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot<'a> {
    pub exported_at: Timestamp,
    pub state: &'a SimulationConfig,
    pub outputs: ExportOutputs,
}

impl<'a> ExportSnapshot<'a> {
    /// An empty run exports empty outputs.
    pub fn new(
        config: &'a SimulationConfig,
        result: Option<&SimulationResult>,
        resolution: Resolution,
        exported_at: Timestamp,
    ) -> Self {
        let outputs = match result {
            Some(result) => ExportOutputs {
                resolution,
                buckets: bucketize(result, resolution),
                flow: bucketize_flow_by_category(result, resolution),
            },
            None => ExportOutputs {
                resolution,
                buckets: Vec::new(),
                flow: FlowBreakdown {
                    labels: Vec::new(),
                    categories: Vec::new(),
                    data: Vec::new(),
                },
            },
        };
        Self {
            exported_at,
            state: config,
            outputs,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_core::{RuleBuilder, ScenarioBuilder, simulate};

    fn salary_and_rent() -> SimulationConfig {
        ScenarioBuilder::new()
            .start(2024, 1, 1)
            .years(1)
            .starting_balance(100.0)
            .rule(RuleBuilder::income("1200").on(1, 1, 2024).label("Salary"))
            .rule(RuleBuilder::expense("1300").on(2, 1, 2024).label("Rent"))
            .build()
    }

    fn run(config: &SimulationConfig) -> SimulationResult {
        simulate(config).unwrap().unwrap()
    }

    #[test]
    fn test_transactions_csv() {
        let config = salary_and_rent();
        let result = run(&config);
        let mut buffer = Vec::new();
        write_transactions_csv(&result, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "date,in/out,amount,resulting_balance");
        assert_eq!(lines[1], "2024-01-01,in,1200.00,1300.00");
        assert_eq!(lines[2], "2024-01-02,out,1300.00,0.00");
        assert_eq!(lines[3], "2024-02-01,in,1200.00,1200.00");
        // Two flows per month over twelve months
        assert_eq!(lines.len(), 1 + 24);
    }

    #[test]
    fn test_summary_reports_lowest_cash_point() {
        let config = ScenarioBuilder::new()
            .start(2024, 1, 1)
            .years(1)
            .rule(RuleBuilder::expense("50").on(15, 3, 2024).once())
            .rule(RuleBuilder::income("x").on(31, 2, 2024))
            .build();
        let result = run(&config);
        let text = summary_text(&config, &result);

        assert!(text.contains("! Lowest cash point: 15.03.2024 (-50.00 HKD)"), "{text}");
        assert!(text.contains("1 invalid rule(s) skipped"), "{text}");
        assert!(text.contains("rule 2: day 31 does not exist in 2024-02"), "{text}");
    }

    #[test]
    fn test_bucket_table_rows() {
        let config = salary_and_rent();
        let result = run(&config);
        let table = bucket_table(&bucketize(&result, Resolution::Quarterly), result.decimals);
        assert_eq!(table.len(), 4);
        let rendered = table.render();
        assert!(rendered.lines().nth(2).unwrap().starts_with("2024-Q1"));
    }

    #[test]
    fn test_category_table_columns() {
        let config = salary_and_rent();
        let result = run(&config);
        let breakdown = bucketize_flow_by_category(&result, Resolution::Yearly);
        let rendered = category_table(&breakdown, result.decimals).render();
        let header = rendered.lines().next().unwrap();
        assert!(header.starts_with("Period"));
        assert!(header.find("Rent").unwrap() < header.find("Salary").unwrap());
        assert!(rendered.contains("-15,600.00"));
        assert!(rendered.contains("14,400.00"));
    }

    #[test]
    fn test_investment_table_only_when_investing() {
        let config = salary_and_rent();
        let result = run(&config);
        assert!(investment_table(&result, Resolution::Monthly).is_none());
    }

    #[test]
    fn test_export_snapshot_shape() {
        let config = salary_and_rent();
        let result = run(&config);
        let exported_at: Timestamp = "2024-05-01T10:00:00Z".parse().unwrap();
        let snapshot = ExportSnapshot::new(&config, Some(&result), Resolution::Monthly, exported_at);
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(value["exportedAt"], "2024-05-01T10:00:00Z");
        assert_eq!(value["state"]["startDate"], "2024-01-01");
        assert_eq!(value["outputs"]["resolution"], "Monthly");
        assert_eq!(value["outputs"]["buckets"].as_array().unwrap().len(), 12);
        assert_eq!(value["outputs"]["flow"]["categories"][0], "Rent");

        // The snapshot imports back as its state
        let reloaded = SimulationConfig::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_export_snapshot_without_result() {
        let config = SimulationConfig::default();
        let snapshot = ExportSnapshot::new(&config, None, Resolution::Yearly, Timestamp::UNIX_EPOCH);
        assert!(snapshot.outputs.buckets.is_empty());
        assert!(snapshot.outputs.flow.categories.is_empty());
    }
}
