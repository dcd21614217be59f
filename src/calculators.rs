//! Application state shared by all calculators.
//!
//! Owns the rate table, the note counter, the bill sheet and the theme flag,
//! and knows how to snapshot them into a [`Settings`] document and merge a
//! [`SettingsPatch`] back in.

use rust_decimal::Decimal;
use std::path::Path;

use crate::bills::BillSheet;
use crate::error::Result;
use crate::fdr::{calculate_fdr, FdrInput, FdrResult, TaxStatus};
use crate::notes::NoteCounter;
use crate::rates::{ProductCode, RateTable};
use crate::settings::{Settings, SettingsPatch};

#[derive(Debug, Clone, Default)]
pub struct Calculators {
    rates: RateTable,
    dark_mode: bool,
    notes: NoteCounter,
    bills: BillSheet,
}

impl Calculators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the local store at start-up.
    ///
    /// A missing store means first run. A store that cannot be read or
    /// parsed is logged and otherwise ignored, leaving the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        let mut state = Self::default();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings store yet, using defaults");
            return state;
        }
        match SettingsPatch::read_from(path) {
            Ok(patch) => state.apply(patch),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings store");
            }
        }
        state
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn rates_mut(&mut self) -> &mut RateTable {
        &mut self.rates
    }

    pub fn notes(&self) -> &NoteCounter {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut NoteCounter {
        &mut self.notes
    }

    pub fn bills(&self) -> &BillSheet {
        &self.bills
    }

    pub fn bills_mut(&mut self) -> &mut BillSheet {
        &mut self.bills
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Flips the theme and returns the new value.
    pub fn toggle_theme(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    /// FDR projection for a product using the current rate table.
    pub fn fdr(
        &self,
        product: ProductCode,
        principal: Option<Decimal>,
        rate_override: Option<Decimal>,
        tax_status: Option<TaxStatus>,
    ) -> Result<FdrResult> {
        let input = FdrInput::for_product(&self.rates, product, principal, rate_override, tax_status)?;
        calculate_fdr(input)
    }

    pub fn snapshot(&self) -> Settings {
        Settings {
            fdr_rates: self.rates.clone(),
            is_dark_mode: self.dark_mode,
            custom_notes: self.notes.custom_notes().to_vec(),
            note_counter: self.notes.note_counter(),
            bill_counter: self.bills.bill_counter(),
        }
    }

    /// Merges a settings document field by field.
    ///
    /// A new bill counter rebuilds the bill slots, dropping typed amounts.
    pub fn apply(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            fdr_rates,
            is_dark_mode,
            custom_notes,
            note_counter,
            bill_counter,
        } = patch;

        if let Some(rates) = fdr_rates {
            self.rates = rates;
        }
        if let Some(dark) = is_dark_mode {
            self.dark_mode = dark;
        }
        if let Some(notes) = custom_notes {
            self.notes.set_custom_notes(notes);
        }
        if let Some(counter) = note_counter {
            self.notes.set_note_counter(counter);
        }
        if let Some(counter) = bill_counter {
            self.bills = BillSheet::with_slots(counter);
        }
    }

    /// Saves the full snapshot to the local store.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.snapshot().write_to(path)
    }

    /// Writes an export document.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        self.save(path)
    }

    /// Reads and merges an exported document.
    ///
    /// # Errors
    ///
    /// Unreadable or malformed files are reported and nothing is changed.
    pub fn import_from(&mut self, path: &Path) -> Result<()> {
        let patch = SettingsPatch::read_from(path)?;
        self.apply(patch);
        tracing::info!(path = %path.display(), "settings imported");
        Ok(())
    }
}
