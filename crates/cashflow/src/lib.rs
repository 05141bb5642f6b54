//! Command-line front end for the cash-flow projection engine
//!
//! Scenarios live as YAML or JSON files in a data directory (default
//! `~/.cashflow/`). Commands load a scenario, run it through
//! [`cashflow_core::simulate`] and render tables, CSV or JSON exports.

pub mod commands;
pub mod data;
pub mod logging;
pub mod report;
pub mod sample;
pub mod util;

pub use commands::{Command, Context, execute};
pub use data::DataDirectory;
pub use logging::init_logging;
