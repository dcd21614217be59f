//! Utility-bill collection desk.
//!
//! The teller types bill amounts into numbered slots, then the cash handed
//! over. The difference after the bank's handling charge is what goes back
//! to the customer (or what they still owe).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{in_range, CalcError, Result};
use crate::format::{format_currency, parse_amount};

/// Slots shown before any are added by hand.
pub const DEFAULT_BILL_SLOTS: u32 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct BillEntry {
    pub index: u32,
    /// Raw text as typed; empty when cleared.
    pub input: String,
}

/// Sums every parseable amount. Empty or unparseable inputs count as zero.
///
/// # Errors
///
/// Returns an error if the sum does not fit in a `Decimal`.
pub fn total_bills<I, S>(inputs: I) -> Result<Decimal>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .filter_map(|s| parse_amount(s.as_ref()))
        .try_fold(Decimal::ZERO, |sum, amount| {
            in_range("bill", sum.checked_add(amount))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    /// The bank returns money to the customer.
    Refund,
    /// The customer still has to pay the difference.
    Owed,
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub amount: Decimal,
    pub state: SettlementState,
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_currency(self.amount))
    }
}

/// `received - total_bills - bank_charge`, classified by sign.
///
/// # Errors
///
/// Returns an error if the difference does not fit in a `Decimal`.
pub fn settlement(
    total_bills: Decimal,
    received: Decimal,
    bank_charge: Decimal,
) -> Result<Settlement> {
    let after_bills = in_range("received", received.checked_sub(total_bills))?;
    let amount = in_range("bank_charge", after_bills.checked_sub(bank_charge))?;
    let state = if amount > Decimal::ZERO {
        SettlementState::Refund
    } else if amount < Decimal::ZERO {
        SettlementState::Owed
    } else {
        SettlementState::Exact
    };
    Ok(Settlement { amount, state })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillSheet {
    entries: Vec<BillEntry>,
    bill_counter: u32,
    received: String,
    bank_charge: String,
}

impl Default for BillSheet {
    fn default() -> Self {
        Self::with_slots(DEFAULT_BILL_SLOTS)
    }
}

impl BillSheet {
    /// Empty slots numbered `1..=bill_counter`.
    pub fn with_slots(bill_counter: u32) -> Self {
        BillSheet {
            entries: (1..=bill_counter)
                .map(|index| BillEntry {
                    index,
                    input: String::new(),
                })
                .collect(),
            bill_counter,
            received: String::new(),
            bank_charge: String::new(),
        }
    }

    pub fn entries(&self) -> &[BillEntry] {
        &self.entries
    }

    pub fn bill_counter(&self) -> u32 {
        self.bill_counter
    }

    /// Appends the next numbered slot and returns its index.
    pub fn add_bill_slot(&mut self) -> u32 {
        self.bill_counter += 1;
        self.entries.push(BillEntry {
            index: self.bill_counter,
            input: String::new(),
        });
        tracing::info!(index = self.bill_counter, "bill slot added");
        self.bill_counter
    }

    pub fn set_bill(&mut self, index: u32, input: &str) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.index == index)
            .ok_or_else(|| CalcError::invalid("bill", format!("no bill slot #{index}")))?;
        entry.input = input.to_string();
        Ok(())
    }

    /// Fills slots in order starting from #1, adding slots when needed.
    pub fn fill<S: AsRef<str>>(&mut self, inputs: &[S]) {
        for (i, input) in inputs.iter().enumerate() {
            if i >= self.entries.len() {
                self.add_bill_slot();
            }
            self.entries[i].input = input.as_ref().to_string();
        }
    }

    pub fn set_received(&mut self, input: &str) {
        self.received = input.to_string();
    }

    pub fn set_bank_charge(&mut self, input: &str) {
        self.bank_charge = input.to_string();
    }

    pub fn total(&self) -> Result<Decimal> {
        total_bills(self.entries.iter().map(|e| e.input.as_str()))
    }

    pub fn settlement(&self) -> Result<Settlement> {
        settlement(
            self.total()?,
            parse_amount(&self.received).unwrap_or(Decimal::ZERO),
            parse_amount(&self.bank_charge).unwrap_or(Decimal::ZERO),
        )
    }

    /// Blanks every slot plus the received and charge fields. The number of
    /// slots and the counter are kept.
    pub fn clear_all(&mut self) {
        for entry in &mut self.entries {
            entry.input.clear();
        }
        self.received.clear();
        self.bank_charge.clear();
        tracing::info!(slots = self.entries.len(), "all bills cleared");
    }
}
