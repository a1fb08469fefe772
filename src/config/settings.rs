//! User settings for clinic-ledger
//!
//! Manages practice-level preferences: currency symbol, date format, and the
//! VAT rate applied to credit-card payments.

use serde::{Deserialize, Serialize};

use crate::error::ClinicError;
use crate::storage::file_io::write_json_atomic;

use super::paths::ClinicPaths;

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₺".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_vat_rate() -> i64 {
    20
}

/// User settings for clinic-ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used in display output
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// VAT percentage applied to credit-card payments
    #[serde(default = "default_vat_rate")]
    pub vat_rate_percent: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            vat_rate_percent: default_vat_rate(),
        }
    }
}

impl Settings {
    /// Load settings from disk, creating the file with defaults if missing
    pub fn load_or_create(paths: &ClinicPaths) -> Result<Self, ClinicError> {
        let path = paths.settings_file();

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| ClinicError::Io(format!("Failed to read settings: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| ClinicError::Json(format!("Failed to parse settings: {}", e)))
        } else {
            let settings = Self::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ClinicPaths) -> Result<(), ClinicError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
