//! The persisted settings document.
//!
//! ```json
//! {
//!   "fdrRates": { "<productCode>": [ {"min": 0, "max": 1000000, "rate": 4.0} ] },
//!   "isDarkMode": false,
//!   "customNotes": [ {"id": "customNote1", "value": 2000} ],
//!   "noteCounter": 1,
//!   "billCounter": 15
//! }
//! ```
//!
//! An unbounded band is written with `"max": null`. Exports and the local
//! store share this layout. On import every top-level key that is present
//! replaces the matching state; absent keys leave it alone.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::notes::CustomNote;
use crate::rates::RateTable;

/// File name used for exported settings.
pub const EXPORT_FILE_NAME: &str = "banglabank-settings.json";

/// Full snapshot of everything that is persisted, always written as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub fdr_rates: RateTable,
    pub is_dark_mode: bool,
    pub custom_notes: Vec<CustomNote>,
    pub note_counter: u32,
    pub bill_counter: u32,
}

impl Settings {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "settings written");
        Ok(())
    }
}

/// A possibly partial settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub fdr_rates: Option<RateTable>,
    pub is_dark_mode: Option<bool>,
    pub custom_notes: Option<Vec<CustomNote>>,
    pub note_counter: Option<u32>,
    pub bill_counter: Option<u32>,
}

impl SettingsPatch {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl From<Settings> for SettingsPatch {
    fn from(settings: Settings) -> Self {
        SettingsPatch {
            fdr_rates: Some(settings.fdr_rates),
            is_dark_mode: Some(settings.is_dark_mode),
            custom_notes: Some(settings.custom_notes),
            note_counter: Some(settings.note_counter),
            bill_counter: Some(settings.bill_counter),
        }
    }
}
