//! `banglabank_calculators` is the calculation core of a bank teller's desk.
//!
//! It covers the everyday counter arithmetic:
//! - **Note tally**: counting cash by denomination, with teller-defined
//!   extra denominations.
//! - **FDR projection**: profit on a Fixed Deposit Receipt from a tiered
//!   rate table, before and after withholding tax.
//! - **Loan EMI**: the Equal Monthly Installment for an amortized loan,
//!   with totals and a month-by-month schedule.
//! - **Utility bills**: summing collected bills and working out what goes
//!   back to the customer.
//! - **Amount in words**: lakh/crore spelling for cheques and receipts.
//!
//! Everything is computed with [`rust_decimal::Decimal`]. The state that
//! survives between sessions (rates, custom notes, counters, theme) is held by
//! [`Calculators`] and saved as a single JSON document.
//!
//! ## Usage
//!
//! ```rust
//! use banglabank_calculators::{calculate_loan, LoanInput, PeriodUnit};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let input = LoanInput {
//!         principal: Some(dec!(100_000)),
//!         annual_rate_percent: Some(dec!(8.75)),
//!         period: Some(1),
//!         period_unit: PeriodUnit::Years,
//!         processing_fee: Some(dec!(500)),
//!     };
//!
//!     match calculate_loan(input) {
//!         Ok(result) => {
//!             println!("Monthly EMI:    {:.2}", result.emi);
//!             println!("Total interest: {:.2}", result.total_interest);
//!             println!("Grand total:    {:.2}", result.grand_total);
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating EMI: {}", e);
//!         }
//!     }
//! }
//! ```
//!
//! Rates come from the product's band table:
//!
//! ```rust
//! use banglabank_calculators::{Calculators, ProductCode, TaxStatus};
//! use rust_decimal_macros::dec;
//!
//! let state = Calculators::new();
//! let rate = state.rates().resolve_rate(ProductCode::SixMonths, dec!(2_000_000)).unwrap();
//! assert_eq!(rate, dec!(9.0));
//!
//! let fdr = state
//!     .fdr(ProductCode::SixMonths, Some(dec!(2_000_000)), None, Some(TaxStatus::TinHolder))
//!     .unwrap();
//! assert_eq!(fdr.total_profit_before_tax, dec!(90_000));
//! ```

pub mod bills;
pub mod calculators;
pub mod error;
pub mod fdr;
pub mod format;
pub mod loan;
pub mod notes;
pub mod rates;
pub mod settings;
pub mod words;

pub use bills::{settlement, total_bills, BillEntry, BillSheet, Settlement, SettlementState};
pub use calculators::Calculators;
pub use error::{CalcError, Result};
pub use fdr::{calculate_fdr, FdrInput, FdrResult, TaxStatus};
pub use format::{format_amount, format_currency, parse_amount, parse_count};
pub use loan::{calculate_emi, calculate_loan, LoanInput, LoanResult, MonthPayment, PeriodUnit};
pub use notes::{tally, Column, CustomNote, Denomination, NoteCounter, Tally, TallyLine};
pub use rates::{ProductCode, RateBand, RateTable};
pub use settings::{Settings, SettingsPatch, EXPORT_FILE_NAME};
pub use words::{amount_to_words, in_words_caption, signed_amount_to_words, to_words};
