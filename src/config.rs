//! Calculator settings and their environment-variable loader.

use std::path::PathBuf;

use thiserror::Error;

use crate::{decimal::Decimal, engine::Precision};

/// Largest supported fractional precision.
pub const MAX_PRECISION: u32 = 18;

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `key` carried a value that cannot be used.
    #[error("invalid value for {key}: `{value}` ({reason})")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Offending value as text.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Settings read once at startup and passed into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorConfig {
    /// Largest accepted operand magnitude.
    pub max_input_value: Decimal,
    /// Fractional digits kept by every quantization.
    pub precision: u32,
    /// Significant-digit budget of a quantized value.
    pub max_significant_digits: u32,
    /// Bound on the in-memory history log.
    pub max_history_size: usize,
    /// Undo steps remembered before the oldest is forgotten.
    pub max_undo_depth: usize,
    /// Rewrite the history file after every calculation.
    pub auto_save: bool,
    /// Directory holding history files.
    pub history_dir: PathBuf,
    /// Row-format history file name.
    pub history_file: String,
    /// JSON export file name.
    pub json_history_file: String,
    /// Directory for the event log.
    pub log_dir: PathBuf,
    /// Event log file name.
    pub log_file: String,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_input_value: Decimal::from(1000),
            precision: 4,
            max_significant_digits: 28,
            max_history_size: 100,
            max_undo_depth: 100,
            auto_save: true,
            history_dir: PathBuf::from("history"),
            history_file: "history_log.csv".to_string(),
            json_history_file: "history_log.json".to_string(),
            log_dir: PathBuf::from("logs"),
            log_file: "event_log.txt".to_string(),
        }
    }
}

impl CalculatorConfig {
    /// Defaults overridden by `CALCULATOR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("CALCULATOR_MAX_INPUT_VALUE") {
            cfg.max_input_value = v.parse().map_err(|_| invalid("CALCULATOR_MAX_INPUT_VALUE", &v, "not a decimal"))?;
        }
        if let Some(v) = lookup("CALCULATOR_PRECISION") {
            cfg.precision = parse_number("CALCULATOR_PRECISION", &v)?;
        }
        if let Some(v) = lookup("CALCULATOR_MAX_SIGNIFICANT_DIGITS") {
            cfg.max_significant_digits = parse_number("CALCULATOR_MAX_SIGNIFICANT_DIGITS", &v)?;
        }
        if let Some(v) = lookup("CALCULATOR_MAX_HISTORY_SIZE") {
            cfg.max_history_size = parse_number("CALCULATOR_MAX_HISTORY_SIZE", &v)?;
        }
        if let Some(v) = lookup("CALCULATOR_MAX_UNDO_DEPTH") {
            cfg.max_undo_depth = parse_number("CALCULATOR_MAX_UNDO_DEPTH", &v)?;
        }
        if let Some(v) = lookup("CALCULATOR_AUTO_SAVE") {
            cfg.auto_save = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = lookup("CALCULATOR_HISTORY_DIR") {
            cfg.history_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("CSV_HISTORY_FILE") {
            cfg.history_file = v;
        }
        if let Some(v) = lookup("JSON_HISTORY_FILE") {
            cfg.json_history_file = v;
        }
        if let Some(v) = lookup("CALCULATOR_LOG_DIR") {
            cfg.log_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOG_HISTORY_FILE") {
            cfg.log_file = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.precision > MAX_PRECISION {
            return Err(invalid("precision", &self.precision.to_string(), "at most 18 fractional digits"));
        }
        if self.max_significant_digits <= self.precision {
            return Err(invalid(
                "max_significant_digits",
                &self.max_significant_digits.to_string(),
                "must exceed the precision",
            ));
        }
        if self.max_history_size == 0 {
            return Err(invalid("max_history_size", "0", "must hold at least one record"));
        }
        if self.max_undo_depth == 0 {
            return Err(invalid("max_undo_depth", "0", "must keep at least one undo step"));
        }
        if self.max_input_value.is_negative() || self.max_input_value.is_zero() {
            return Err(invalid(
                "max_input_value",
                &self.max_input_value.to_string(),
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Rounding context for the engine.
    pub fn precision(&self) -> Precision {
        Precision {
            fractional_digits: self.precision,
            significant_digits: self.max_significant_digits,
        }
    }

    /// Full path of the row-format history file.
    pub fn history_path(&self) -> PathBuf {
        self.history_dir.join(&self.history_file)
    }

    /// Full path of the JSON export.
    pub fn json_history_path(&self) -> PathBuf {
        self.history_dir.join(&self.json_history_file)
    }

    /// Full path of the event log.
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

fn invalid(key: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason,
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value, "not a non-negative integer"))
}
