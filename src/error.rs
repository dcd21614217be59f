use rust_decimal::Decimal;
use thiserror::Error;

use crate::rates::ProductCode;

/// Every way a calculator operation can be refused.
///
/// None of these are fatal: the caller reports the message and the
/// in-memory state stays exactly as it was before the call.
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Please fill all required fields: '{0}' is missing")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Please select an income tax option")]
    MissingTaxStatus,

    #[error("This denomination already exists: {0}")]
    DuplicateDenomination(Decimal),

    #[error("No custom denomination with id '{0}'")]
    UnknownDenomination(String),

    #[error("Denomination '{0}' is built in and cannot be removed")]
    FixedDenomination(String),

    #[error("Unknown deposit product '{0}'")]
    UnknownProduct(String),

    #[error("No rate bands configured for product '{0}'")]
    NoRateBands(ProductCode),

    #[error("Product '{product}' has no rate band #{index}")]
    BandOutOfRange { product: ProductCode, index: usize },

    #[error("Settings document is malformed: {source}")]
    SettingsParse {
        #[from]
        source: serde_json::Error,
    },

    #[error("Settings I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CalcError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Errors caused by what the user typed, as opposed to the
    /// environment (unreadable or malformed settings files).
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, CalcError::SettingsParse { .. } | CalcError::Io { .. })
    }
}

pub type Result<T, E = CalcError> = std::result::Result<T, E>;

/// Rejects an absent or non-positive required amount.
pub(crate) fn require_positive(field: &'static str, value: Option<Decimal>) -> Result<Decimal> {
    match value {
        None => {
            tracing::debug!(field, "required field left blank");
            Err(CalcError::MissingField(field))
        }
        Some(v) if v <= Decimal::ZERO => {
            tracing::debug!(field, value = %v, "rejected non-positive input");
            Err(CalcError::invalid(field, "must be greater than zero"))
        }
        Some(v) => Ok(v),
    }
}

/// Unwraps a `checked_*` result, reporting overflow against `field`.
pub(crate) fn in_range(field: &'static str, value: Option<Decimal>) -> Result<Decimal> {
    value.ok_or_else(|| {
        tracing::debug!(field, "arithmetic overflow");
        CalcError::invalid(field, "amount too large")
    })
}
