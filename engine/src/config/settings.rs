// Exporter settings, loaded from a JSON file. Missing keys take defaults.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::data::csv_writer::ExportFormat;
use crate::error::EngineError;

const DEFAULT_CONFIG: &str = include_str!("../../config/default.json");

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RsiSettings {
    /// Directory holding `{SYMBOL}_{interval}.csv` provider exports.
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub default_period: usize,
    pub default_lookback_days: u32,
    pub default_warmup_days: u32,
    pub preview_rows: usize,
    pub prefer_adjusted: bool,
    pub price_decimals: u32,
    pub rsi_decimals: u32,
    /// Also write an `.xlsx` workbook next to the CSV.
    pub export_excel: bool,
}

impl Default for RsiSettings {
    fn default() -> Self {
        RsiSettings {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("exports"),
            default_period: 14,
            default_lookback_days: 365,
            default_warmup_days: 0,
            preview_rows: 20,
            prefer_adjusted: true,
            price_decimals: 4,
            rsi_decimals: 2,
            export_excel: false,
        }
    }
}

impl RsiSettings {
    /// Settings bundled with the binary.
    pub fn load_default() -> Result<Self, EngineError> {
        Self::from_json(DEFAULT_CONFIG)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, EngineError> {
        let settings: RsiSettings = serde_json::from_str(content)
            .map_err(|e| EngineError::ConfigError(format!("Invalid config JSON: {}", e)))?;
        if settings.default_period == 0 {
            return Err(EngineError::ConfigError("default_period must be at least 1".to_string()));
        }
        Ok(settings)
    }

    pub fn export_format(&self) -> ExportFormat {
        ExportFormat {
            price_decimals: self.price_decimals,
            rsi_decimals: self.rsi_decimals,
        }
    }
}
