pub mod storage;

pub use storage::{DataDirectory, ScenarioFormat, StorageError, load_scenario_file, save_scenario_file};
