use cashflow::{Command, Context, DataDirectory, execute, init_logging};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cashflow")]
#[command(about = "Day-by-day cash-flow projection from recurring income and expense rules")]
struct Args {
    /// Path to the data directory (default: ~/.cashflow/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(DataDirectory::default_path);

    init_logging(&data_dir, &args.log_level)?;

    let ctx = Context::new(DataDirectory::new(data_dir));
    let output = execute(&args.command, &ctx)?;
    print!("{output}");

    tracing::info!("cashflow finished");
    Ok(())
}
