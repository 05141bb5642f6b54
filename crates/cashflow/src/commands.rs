//! Subcommands of the `cashflow` binary
//!
//! Every command returns the text to print so the binary stays a thin shell.

use std::path::PathBuf;

use cashflow_core::compile::collect_all_labels;
use cashflow_core::model::SimulationResult;
use cashflow_core::{
    Resolution, SimulationConfig, SortKey, bucketize, bucketize_flow_by_category, simulate,
};
use clap::{Args, Subcommand};
use color_eyre::eyre::bail;
use jiff::Timestamp;
use jiff::civil::Date;
use tracing::info;

use crate::data::{DataDirectory, save_scenario_file};
use crate::report::{
    ExportSnapshot, bucket_table, category_table, investment_table, summary_text,
    transactions_table, write_transactions_csv,
};
use crate::sample::sample_scenario;
use crate::util::io::{atomic_write, atomic_write_bytes};

/// Shown instead of a report when the window has no days
pub const EMPTY_WINDOW: &str = "Simulation window is empty; nothing to report.\n";

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Scenario name in the data directory, or a path to a .yaml/.json file
    pub scenario: String,

    /// Bucket size (daily, weekly, monthly, quarterly, yearly); defaults to the scenario's
    #[arg(short, long)]
    pub resolution: Option<Resolution>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a starter scenario beginning today
    Init {
        #[arg(default_value = "example")]
        name: String,
        /// Overwrite an existing scenario
        #[arg(long)]
        force: bool,
    },
    /// List scenarios in the data directory
    List,
    /// Summary and per-bucket balance table
    Report(ScenarioArgs),
    /// Net flow per category and bucket
    Categories(ScenarioArgs),
    /// Swept cash and investment value per bucket
    Investment(ScenarioArgs),
    /// Days with a non-zero net flow
    Transactions {
        #[command(flatten)]
        args: ScenarioArgs,
        /// Write CSV to this file instead of printing a table
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Scenario plus aggregated outputs as JSON
    Export {
        #[command(flatten)]
        args: ScenarioArgs,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// All labels used by the scenario's rules
    Labels { scenario: String },
    /// Reorder the scenario's rules and save it
    Sort {
        scenario: String,
        /// amount, year, direction, frequency, effective, labels or date
        #[arg(long)]
        by: SortKey,
        #[arg(long)]
        descending: bool,
    },
    /// Infer blank rule years from the start date and save the scenario
    FillYears { scenario: String },
}

/// Everything a command reads from its environment
pub struct Context {
    pub data: DataDirectory,
    pub today: Date,
    pub now: Timestamp,
}

impl Context {
    pub fn new(data: DataDirectory) -> Self {
        let now = Timestamp::now();
        Self {
            data,
            today: jiff::Zoned::now().date(),
            now,
        }
    }
}

struct Loaded {
    config: SimulationConfig,
    result: Option<SimulationResult>,
    resolution: Resolution,
}

fn load_and_simulate(ctx: &Context, args: &ScenarioArgs) -> color_eyre::Result<Loaded> {
    let config = ctx.data.load(&args.scenario)?;
    let result = simulate(&config)?;
    let resolution = args.resolution.unwrap_or(config.resolution);
    if let Some(result) = &result {
        info!(
            scenario = %args.scenario,
            days = result.total_days(),
            invalid_rules = result.invalid_rule_count(),
            "simulated scenario"
        );
    }
    Ok(Loaded {
        config,
        result,
        resolution,
    })
}

pub fn execute(command: &Command, ctx: &Context) -> color_eyre::Result<String> {
    match command {
        Command::Init { name, force } => init(ctx, name, *force),
        Command::List => {
            let names = ctx.data.list_scenarios()?;
            if names.is_empty() {
                return Ok(format!(
                    "No scenarios in {}. Run `cashflow init` to create one.\n",
                    ctx.data.root().display()
                ));
            }
            Ok(names.iter().map(|n| format!("{n}\n")).collect())
        }
        Command::Report(args) => {
            let loaded = load_and_simulate(ctx, args)?;
            let Some(result) = &loaded.result else {
                return Ok(EMPTY_WINDOW.to_string());
            };
            let buckets = bucketize(result, loaded.resolution);
            Ok(format!(
                "{}\n{} buckets\n{}",
                summary_text(&loaded.config, result),
                loaded.resolution,
                bucket_table(&buckets, result.decimals).render()
            ))
        }
        Command::Categories(args) => {
            let loaded = load_and_simulate(ctx, args)?;
            let Some(result) = &loaded.result else {
                return Ok(EMPTY_WINDOW.to_string());
            };
            let breakdown = bucketize_flow_by_category(result, loaded.resolution);
            Ok(category_table(&breakdown, result.decimals).render())
        }
        Command::Investment(args) => {
            let loaded = load_and_simulate(ctx, args)?;
            let Some(result) = &loaded.result else {
                return Ok(EMPTY_WINDOW.to_string());
            };
            match investment_table(result, loaded.resolution) {
                Some(table) => Ok(table.render()),
                None => Ok("Investing is off for this scenario.\n".to_string()),
            }
        }
        Command::Transactions { args, csv } => {
            let loaded = load_and_simulate(ctx, args)?;
            let Some(result) = &loaded.result else {
                return Ok(EMPTY_WINDOW.to_string());
            };
            match csv {
                Some(path) => {
                    let mut buffer = Vec::new();
                    write_transactions_csv(result, &mut buffer)?;
                    atomic_write_bytes(path, &buffer)?;
                    Ok(format!(
                        "Wrote {} transactions to {}\n",
                        result.transactions().len(),
                        path.display()
                    ))
                }
                None => Ok(transactions_table(result).render()),
            }
        }
        Command::Export { args, output } => {
            let loaded = load_and_simulate(ctx, args)?;
            let snapshot = ExportSnapshot::new(
                &loaded.config,
                loaded.result.as_ref(),
                loaded.resolution,
                ctx.now,
            );
            let json = snapshot.to_json()?;
            match output {
                Some(path) => {
                    atomic_write(path, &json)?;
                    Ok(format!("Exported to {}\n", path.display()))
                }
                None => Ok(format!("{json}\n")),
            }
        }
        Command::Labels { scenario } => {
            let config = ctx.data.load(scenario)?;
            Ok(collect_all_labels(&config.rows)
                .iter()
                .map(|label| format!("{label}\n"))
                .collect())
        }
        Command::Sort {
            scenario,
            by,
            descending,
        } => {
            let mut config = ctx.data.load(scenario)?;
            config.sort_rules(*by, !*descending);
            let path = ctx.data.save(scenario, &config)?;
            info!(path = %path.display(), key = ?by, "sorted rules");
            Ok(format!("Sorted rules of {} by {:?}\n", path.display(), by))
        }
        Command::FillYears { scenario } => {
            let mut config = ctx.data.load(scenario)?;
            let filled = config.fill_missing_years()?;
            if filled == 0 {
                return Ok("No blank years to fill.\n".to_string());
            }
            let path = ctx.data.save(scenario, &config)?;
            Ok(format!("Filled {filled} year(s) in {}\n", path.display()))
        }
    }
}

fn init(ctx: &Context, name: &str, force: bool) -> color_eyre::Result<String> {
    let path = ctx.data.scenario_path(name);
    if path.exists() && !force {
        bail!(
            "scenario {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    ctx.data.init()?;
    let config = sample_scenario(ctx.today)?;
    save_scenario_file(&path, &config)?;
    info!(path = %path.display(), "created sample scenario");
    Ok(format!("Created {}\n", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use std::fs;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> Context {
        Context {
            data: DataDirectory::new(dir.path().to_path_buf()),
            today: date(2024, 1, 10),
            now: "2024-01-10T08:00:00Z".parse().unwrap(),
        }
    }

    fn scenario(name: &str) -> ScenarioArgs {
        ScenarioArgs {
            scenario: name.to_string(),
            resolution: None,
        }
    }

    #[test]
    fn test_init_then_report() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let created = execute(
            &Command::Init {
                name: "home".into(),
                force: false,
            },
            &ctx,
        )
        .unwrap();
        assert!(created.starts_with("Created"));
        assert_eq!(ctx.data.list_scenarios().unwrap(), vec!["home"]);

        let report = execute(&Command::Report(scenario("home")), &ctx).unwrap();
        assert!(report.contains("Window: 2024-01-10 to 2026-01-10"), "{report}");
        assert!(report.contains("Monthly buckets"), "{report}");
        assert!(report.contains("2024-01"), "{report}");
        assert!(!report.contains("invalid rule"), "{report}");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let init = |force| Command::Init {
            name: "home".into(),
            force,
        };

        execute(&init(false), &ctx).unwrap();
        assert!(execute(&init(false), &ctx).is_err());
        assert!(execute(&init(true), &ctx).is_ok());
    }

    #[test]
    fn test_transactions_csv_file() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        execute(
            &Command::Init {
                name: "home".into(),
                force: false,
            },
            &ctx,
        )
        .unwrap();

        let csv_path = dir.path().join("out").join("tx.csv");
        let message = execute(
            &Command::Transactions {
                args: scenario("home"),
                csv: Some(csv_path.clone()),
            },
            &ctx,
        )
        .unwrap();
        assert!(message.starts_with("Wrote"));

        let text = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("date,in/out,amount,resulting_balance")
        );
    }

    #[test]
    fn test_export_to_file_reimports() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        execute(
            &Command::Init {
                name: "home".into(),
                force: false,
            },
            &ctx,
        )
        .unwrap();

        let output = dir.path().join("export.json");
        execute(
            &Command::Export {
                args: ScenarioArgs {
                    scenario: "home".into(),
                    resolution: Some(Resolution::Yearly),
                },
                output: Some(output.clone()),
            },
            &ctx,
        )
        .unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["exportedAt"], "2024-01-10T08:00:00Z");
        assert_eq!(value["outputs"]["resolution"], "Yearly");
        // 2024, 2025 and the first days of 2026
        assert_eq!(value["outputs"]["buckets"].as_array().unwrap().len(), 3);

        let original = ctx.data.load("home").unwrap();
        let imported = ctx.data.load(output.to_str().unwrap()).unwrap();
        assert_eq!(imported, original);
    }

    #[test]
    fn test_sort_and_fill_years_rewrite_file() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let path = dir.path().join("plan.json");
        fs::write(
            &path,
            r#"{
                "startDate": "2024-06-01",
                "rows": [
                    {"direction": "out", "amount": "50", "dateStr": "1.3"},
                    {"direction": "in", "amount": "900", "dateStr": "10.7", "year": "2024"},
                    {"direction": "out", "amount": "5", "dateStr": "1.8"}
                ]
            }"#,
        )
        .unwrap();
        let scenario = path.to_str().unwrap().to_string();

        let message = execute(
            &Command::FillYears {
                scenario: scenario.clone(),
            },
            &ctx,
        )
        .unwrap();
        assert!(message.starts_with("Filled 2 year(s)"), "{message}");
        let config = ctx.data.load(&scenario).unwrap();
        assert_eq!(config.rows[0].year, "2025");
        assert_eq!(config.rows[2].year, "2024");

        execute(
            &Command::Sort {
                scenario: scenario.clone(),
                by: SortKey::Amount,
                descending: true,
            },
            &ctx,
        )
        .unwrap();
        let config = ctx.data.load(&scenario).unwrap();
        let amounts: Vec<&str> = config.rows.iter().map(|r| r.amount.as_str()).collect();
        assert_eq!(amounts, vec!["900", "50", "5", ""]);

        let again = execute(&Command::FillYears { scenario }, &ctx).unwrap();
        assert_eq!(again, "No blank years to fill.\n");
    }

    #[test]
    fn test_labels_and_missing_scenario() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        execute(
            &Command::Init {
                name: "home".into(),
                force: false,
            },
            &ctx,
        )
        .unwrap();

        let labels = execute(
            &Command::Labels {
                scenario: "home".into(),
            },
            &ctx,
        )
        .unwrap();
        assert_eq!(labels, "Housing\nInsurance\nSalary\nTravel\nUtilities\n");

        assert!(execute(&Command::Report(scenario("missing")), &ctx).is_err());
    }

    #[test]
    fn test_empty_window() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let path = dir.path().join("empty.json");
        fs::write(&path, r#"{"startDate": "2024-01-01", "timeframeYears": 0}"#).unwrap();

        let report = execute(
            &Command::Report(scenario(path.to_str().unwrap())),
            &ctx,
        )
        .unwrap();
        assert_eq!(report, EMPTY_WINDOW);
    }
}
