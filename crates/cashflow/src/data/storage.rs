//! Scenario file storage
//!
//! Directory structure:
//! ~/.cashflow/
//!   cashflow.log
//!   scenarios/
//!     household.yaml
//!     freelance.json
//!
//! A scenario is a [`SimulationConfig`] stored as YAML or JSON; the format is
//! chosen by file extension. Files outside the data directory can be used
//! directly by path.

use std::fs;
use std::path::{Path, PathBuf};

use cashflow_core::SimulationConfig;
use tracing::debug;

use crate::util::io::atomic_write;

/// Error types for storage operations
#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Parse(String),
    Serialize(String),
    NotFound(PathBuf),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "IO error: {}", msg),
            StorageError::Parse(msg) => write!(f, "Parse error: {}", msg),
            StorageError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::NotFound(path) => write!(f, "Scenario not found: {}", path.display()),
        }
    }
}

impl std::error::Error for StorageError {}

/// On-disk scenario encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Yaml,
    Json,
}

impl ScenarioFormat {
    /// `.json` is JSON; everything else is read and written as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ScenarioFormat::Json,
            _ => ScenarioFormat::Yaml,
        }
    }

    pub fn parse(self, content: &str) -> Result<SimulationConfig, StorageError> {
        let value: serde_json::Value = match self {
            ScenarioFormat::Json => serde_json::from_str(content)
                .map_err(|e| StorageError::Parse(format!("Failed to parse JSON: {}", e)))?,
            ScenarioFormat::Yaml => serde_saphyr::from_str(content)
                .map_err(|e| StorageError::Parse(format!("Failed to parse YAML: {}", e)))?,
        };
        SimulationConfig::from_value(value)
            .map_err(|e| StorageError::Parse(format!("Invalid scenario: {}", e)))
    }

    pub fn render(self, config: &SimulationConfig) -> Result<String, StorageError> {
        match self {
            ScenarioFormat::Json => config.to_json().map_err(|e| {
                StorageError::Serialize(format!("Failed to serialize scenario: {}", e))
            }),
            ScenarioFormat::Yaml => serde_saphyr::to_string(config).map_err(|e| {
                StorageError::Serialize(format!("Failed to serialize scenario: {}", e))
            }),
        }
    }
}

/// Read a scenario file in the format its extension names.
pub fn load_scenario_file(path: &Path) -> Result<SimulationConfig, StorageError> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let config = ScenarioFormat::from_path(path).parse(&content)?;
    debug!(path = %path.display(), rules = config.rows.len(), "loaded scenario");
    Ok(config)
}

/// Write a scenario file atomically in the format its extension names.
pub fn save_scenario_file(path: &Path, config: &SimulationConfig) -> Result<(), StorageError> {
    let content = ScenarioFormat::from_path(path).render(config)?;
    atomic_write(path, &content)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "saved scenario");
    Ok(())
}

/// Manages the data directory holding named scenarios
pub struct DataDirectory {
    root: PathBuf,
}

impl DataDirectory {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the default data directory path (~/.cashflow/)
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cashflow")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scenarios_dir(&self) -> PathBuf {
        self.root.join("scenarios")
    }

    /// Path of a named scenario; names without an extension are YAML.
    pub fn scenario_path(&self, name: &str) -> PathBuf {
        let file = sanitize_filename(name);
        if Path::new(&file).extension().is_some() {
            self.scenarios_dir().join(file)
        } else {
            self.scenarios_dir().join(format!("{}.yaml", file))
        }
    }

    pub fn exists(&self) -> bool {
        self.root.exists() && self.scenarios_dir().exists()
    }

    pub fn init(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.scenarios_dir()).map_err(|e| {
            StorageError::Io(format!("Failed to create scenarios directory: {}", e))
        })
    }

    /// Resolve a scenario argument: an existing file path is used as is,
    /// anything else names a scenario in the data directory.
    pub fn resolve(&self, scenario: &str) -> PathBuf {
        let direct = Path::new(scenario);
        if direct.is_file() {
            direct.to_path_buf()
        } else {
            self.scenario_path(scenario)
        }
    }

    pub fn load(&self, scenario: &str) -> Result<SimulationConfig, StorageError> {
        load_scenario_file(&self.resolve(scenario))
    }

    pub fn save(&self, scenario: &str, config: &SimulationConfig) -> Result<PathBuf, StorageError> {
        let path = self.resolve(scenario);
        save_scenario_file(&path, config)?;
        Ok(path)
    }

    /// Names (file stems) of the stored scenarios, sorted.
    pub fn list_scenarios(&self) -> Result<Vec<String>, StorageError> {
        let dir = self.scenarios_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir)
            .map_err(|e| StorageError::Io(format!("Failed to read scenarios directory: {}", e)))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StorageError::Io(format!("Failed to read directory entry: {}", e)))?
                .path();
            let is_scenario = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e, "yaml" | "yml" | "json"));
            if is_scenario && let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Sanitize a filename to be safe for the filesystem
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_core::{RuleBuilder, ScenarioBuilder};
    use tempfile::TempDir;

    fn scenario() -> SimulationConfig {
        ScenarioBuilder::new()
            .start(2024, 1, 1)
            .years(2)
            .starting_balance(1_000.0)
            .currency("USD")
            .rule(RuleBuilder::income("3200").on(25, 1, 2024).label("Salary"))
            .rule(
                RuleBuilder::expense("1450.5")
                    .on(1, 1, 2024)
                    .label("Rent")
                    .escalate_yearly(3.0),
            )
            .build()
    }

    #[test]
    fn test_data_directory_init() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = DataDirectory::new(temp_dir.path().join(".cashflow"));

        assert!(!data_dir.exists());
        data_dir.init().unwrap();
        assert!(data_dir.exists());
    }

    #[test]
    fn test_save_and_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = DataDirectory::new(temp_dir.path().to_path_buf());
        data_dir.init().unwrap();

        let config = scenario();
        let path = data_dir.save("household", &config).unwrap();
        assert_eq!(path.extension().unwrap(), "yaml");

        let loaded = data_dir.load("household").unwrap();
        assert_eq!(loaded, config);
        assert_eq!(data_dir.list_scenarios().unwrap(), vec!["household"]);
    }

    #[test]
    fn test_save_and_load_json_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plan.json");

        let config = scenario();
        save_scenario_file(&path, &config).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"startDate\": \"2024-01-01\""));

        let data_dir = DataDirectory::new(temp_dir.path().join("unused"));
        let loaded = data_dir.load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_yaml_with_numeric_fields() {
        let yaml = "startDate: 2024-03-01\n\
                    timeframeYears: 1\n\
                    rows:\n\
                    \x20 - direction: out\n\
                    \x20   amount: 99.5\n\
                    \x20   dateStr: 1.3\n\
                    \x20   year: 2024\n\
                    \x20   note: Phone\n";
        let config = ScenarioFormat::Yaml.parse(yaml).unwrap();
        let rule = &config.rows[0];
        assert_eq!(rule.amount, "99.5");
        assert_eq!(rule.year, "2024");
        assert_eq!(rule.labels, vec!["Phone"]);
    }

    #[test]
    fn test_yaml_keeps_numeric_looking_text() {
        let config = ScenarioBuilder::new()
            .start(2024, 1, 1)
            .rule(RuleBuilder::expense("20.10").day_month(1, 10).year(2024))
            .build();
        let yaml = ScenarioFormat::Yaml.render(&config).unwrap();
        let loaded = ScenarioFormat::Yaml.parse(&yaml).unwrap();
        assert_eq!(loaded.rows[0].date_str, "1.10");
        assert_eq!(loaded.rows[0].amount, "20.10");
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = DataDirectory::new(temp_dir.path().to_path_buf());
        assert!(matches!(
            data_dir.load("nope"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ScenarioFormat::Json.parse("{not json"),
            Err(StorageError::Parse(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ScenarioFormat::from_path(Path::new("a.JSON")), ScenarioFormat::Json);
        assert_eq!(ScenarioFormat::from_path(Path::new("a.yml")), ScenarioFormat::Yaml);
        assert_eq!(ScenarioFormat::from_path(Path::new("a")), ScenarioFormat::Yaml);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("simple"), "simple");
        assert_eq!(sanitize_filename("with spaces"), "with spaces");
        assert_eq!(sanitize_filename("with/slash"), "with_slash");
        assert_eq!(sanitize_filename("test:colon"), "test_colon");
    }
}
