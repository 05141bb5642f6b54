use std::fmt;

/// Reasons a raw rule is rejected by the compiler.
///
/// A rejected rule is skipped by the simulation; the error only travels back
/// to the caller so the offending row can be highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The day-month text is not `D.M` or `D.M.`
    MalformedDayMonth(String),
    /// The anchor year is blank, zero or not a supported year
    MissingYear(String),
    /// The day does not exist in that month of the anchor year
    DayOutOfRange { day: i8, month: i8, year: i16 },
    /// The end date is not a valid `YYYY-MM-DD` date
    MalformedEndDate(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::MalformedDayMonth(text) => {
                write!(f, "date {text:?} is not in D.M format")
            }
            RuleError::MissingYear(text) => write!(f, "year {text:?} is not a valid year"),
            RuleError::DayOutOfRange { day, month, year } => {
                write!(f, "day {day} does not exist in {year}-{month:02}")
            }
            RuleError::MalformedEndDate(text) => {
                write!(f, "end date {text:?} is not a valid YYYY-MM-DD date")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// Errors reading or writing a saved scenario.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    /// The scenario start date is not a valid `YYYY-MM-DD` date
    InvalidStartDate(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "invalid scenario JSON: {e}"),
            ConfigError::InvalidStartDate(text) => {
                write!(f, "start date {text:?} is not a valid YYYY-MM-DD date")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::InvalidStartDate(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

/// A resolution name that is not one of the supported bucket sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResolutionError(pub String);

impl fmt::Display for ParseResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown resolution {:?} (expected daily, weekly, monthly, quarterly or yearly)",
            self.0
        )
    }
}

impl std::error::Error for ParseResolutionError {}
