//! Fixed Deposit Receipt profit projection.
//!
//! Profit is simple interest on the principal for the product's term. Tax
//! is withheld at 10% for TIN holders and 15% for everyone else.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{in_range, require_positive, CalcError, Result};
use crate::rates::{ProductCode, RateTable};

/// Whether the depositor holds a Taxpayer Identification Number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxStatus {
    TinHolder,
    NonTinHolder,
}

impl TaxStatus {
    /// Withholding tax in percent.
    pub fn rate_percent(self) -> Decimal {
        match self {
            TaxStatus::TinHolder => dec!(10),
            TaxStatus::NonTinHolder => dec!(15),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaxStatus::TinHolder => "TIN Holder",
            TaxStatus::NonTinHolder => "Non-TIN Holder",
        }
    }
}

impl FromStr for TaxStatus {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "tin" | "tin-holder" => Ok(TaxStatus::TinHolder),
            "no" | "non-tin" | "non-tin-holder" => Ok(TaxStatus::NonTinHolder),
            other => Err(CalcError::invalid(
                "tax_status",
                format!("expected 'yes' or 'no', got '{other}'"),
            )),
        }
    }
}

/// Input for an FDR projection. Optional fields model blank form inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdrInput {
    pub principal: Option<Decimal>,
    /// Annual rate as a percentage (e.g. 8.75 for 8.75%).
    pub annual_rate_percent: Option<Decimal>,
    pub term_years: Decimal,
    pub tax_status: Option<TaxStatus>,
}

impl FdrInput {
    /// Fills rate and term from the product, unless a rate is given explicitly.
    pub fn for_product(
        table: &RateTable,
        product: ProductCode,
        principal: Option<Decimal>,
        rate_override: Option<Decimal>,
        tax_status: Option<TaxStatus>,
    ) -> Result<Self> {
        let annual_rate_percent = match (rate_override, principal) {
            (Some(rate), _) => Some(rate),
            (None, Some(amount)) if amount > Decimal::ZERO => {
                Some(table.resolve_rate(product, amount)?)
            }
            (None, _) => None,
        };

        Ok(FdrInput {
            principal,
            annual_rate_percent,
            term_years: product.term_years(),
            tax_status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdrResult {
    pub principal: Decimal,
    pub annual_rate_percent: Decimal,
    pub term_years: Decimal,
    pub tax_status: TaxStatus,
    pub annual_profit: Decimal,
    pub monthly_profit_before_tax: Decimal,
    pub total_profit_before_tax: Decimal,
    pub tax_rate_percent: Decimal,
    pub tax_amount: Decimal,
    pub monthly_profit_after_tax: Decimal,
    pub total_profit_after_tax: Decimal,
    /// Principal plus after-tax profit.
    pub maturity_value: Decimal,
}

impl FdrResult {
    /// One-line summary of the inputs used.
    pub fn details(&self) -> String {
        format!(
            "Calculation: Annual Rate {}%, Term {} years, Tax Rate {}% ({})",
            self.annual_rate_percent.normalize(),
            self.term_years.round_dp(4).normalize(),
            self.tax_rate_percent,
            self.tax_status.label()
        )
    }
}

/// Projects pre- and post-tax profit for a fixed deposit.
///
/// # Errors
///
/// Returns an error if principal or rate is missing or not positive, if the
/// term is not positive, if no tax status was chosen, or if the profit does
/// not fit in a `Decimal`.
pub fn calculate_fdr(input: FdrInput) -> Result<FdrResult> {
    let principal = require_positive("deposit_amount", input.principal)?;
    let annual_rate_percent = require_positive("interest_rate", input.annual_rate_percent)?;
    if input.term_years <= Decimal::ZERO {
        tracing::debug!(term = %input.term_years, "rejected non-positive term");
        return Err(CalcError::invalid("term", "must be greater than zero"));
    }
    let Some(tax_status) = input.tax_status else {
        tracing::debug!("no tax option selected");
        return Err(CalcError::MissingTaxStatus);
    };

    let hundred = dec!(100);
    let tax_rate_percent = tax_status.rate_percent();

    let annual_profit =
        in_range("deposit_amount", principal.checked_mul(annual_rate_percent))? / hundred;
    let total_profit_before_tax =
        in_range("deposit_amount", annual_profit.checked_mul(input.term_years))?;
    let monthly_profit_before_tax = annual_profit / dec!(12);

    let tax_amount = in_range(
        "deposit_amount",
        total_profit_before_tax.checked_mul(tax_rate_percent),
    )? / hundred;
    let total_profit_after_tax = total_profit_before_tax - tax_amount;
    let monthly_profit_after_tax = monthly_profit_before_tax * (dec!(1) - tax_rate_percent / hundred);
    let maturity_value = in_range("deposit_amount", principal.checked_add(total_profit_after_tax))?;

    Ok(FdrResult {
        principal,
        annual_rate_percent,
        term_years: input.term_years,
        tax_status,
        annual_profit,
        monthly_profit_before_tax,
        total_profit_before_tax,
        tax_rate_percent,
        tax_amount,
        monthly_profit_after_tax,
        total_profit_after_tax,
        maturity_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input(tax_status: Option<TaxStatus>) -> FdrInput {
        FdrInput {
            principal: Some(dec!(500000)),
            annual_rate_percent: Some(dec!(8.75)),
            term_years: ProductCode::SixMonths.term_years(),
            tax_status,
        }
    }

    #[test]
    fn test_six_month_tin_holder() {
        let result = calculate_fdr(input(Some(TaxStatus::TinHolder))).unwrap();

        assert_eq!(result.annual_profit, dec!(43750));
        assert_eq!(result.total_profit_before_tax.round_dp(2), dec!(21875.00));
        assert_eq!(result.tax_amount.round_dp(2), dec!(2187.50));
        assert_eq!(result.total_profit_after_tax.round_dp(2), dec!(19687.50));
        assert_eq!(result.monthly_profit_before_tax.round_dp(2), dec!(3645.83));
        assert_eq!(result.monthly_profit_after_tax.round_dp(2), dec!(3281.25));
        assert_eq!(result.maturity_value.round_dp(2), dec!(519687.50));
    }

    #[test]
    fn test_tin_holder_pays_less_tax() {
        let tin = calculate_fdr(input(Some(TaxStatus::TinHolder))).unwrap();
        let non_tin = calculate_fdr(input(Some(TaxStatus::NonTinHolder))).unwrap();

        assert!(tin.tax_amount < non_tin.tax_amount);
        assert_eq!(tin.total_profit_before_tax, non_tin.total_profit_before_tax);
        assert_eq!(non_tin.tax_rate_percent, dec!(15));
    }

    #[test]
    fn test_missing_tax_status_is_reported() {
        assert!(matches!(
            calculate_fdr(input(None)),
            Err(CalcError::MissingTaxStatus)
        ));
    }

    #[rstest]
    #[case(None, Some(dec!(8)))]
    #[case(Some(dec!(0)), Some(dec!(8)))]
    #[case(Some(dec!(1000)), None)]
    #[case(Some(dec!(1000)), Some(dec!(-1)))]
    fn test_rejects_missing_or_non_positive(
        #[case] principal: Option<Decimal>,
        #[case] rate: Option<Decimal>,
    ) {
        let result = calculate_fdr(FdrInput {
            principal,
            annual_rate_percent: rate,
            term_years: dec!(1),
            tax_status: Some(TaxStatus::TinHolder),
        });
        assert!(result.is_err());
    }

    #[rstest]
    #[case(dec!(70000000000000000000000000000), dec!(12))]
    #[case(dec!(1000000000000000000000000), dec!(1000000000000000))]
    #[case(dec!(79000000000000000000000000000), dec!(1))]
    fn test_oversized_deposit_is_rejected(#[case] principal: Decimal, #[case] rate: Decimal) {
        let result = calculate_fdr(FdrInput {
            principal: Some(principal),
            annual_rate_percent: Some(rate),
            term_years: dec!(1),
            tax_status: Some(TaxStatus::TinHolder),
        });
        assert!(matches!(
            result,
            Err(CalcError::InvalidInput { field: "deposit_amount", .. })
        ));
    }

    #[test]
    fn test_for_product_resolves_rate_and_term() {
        let table = RateTable::default();
        let input = FdrInput::for_product(
            &table,
            ProductCode::Mis3Year,
            Some(dec!(200000)),
            None,
            Some(TaxStatus::NonTinHolder),
        )
        .unwrap();
        assert_eq!(input.annual_rate_percent, Some(dec!(10.2)));
        assert_eq!(input.term_years, dec!(3));

        let result = calculate_fdr(input).unwrap();
        assert_eq!(result.total_profit_before_tax, dec!(61200));
        assert_eq!(result.maturity_value, dec!(252020));
        assert_eq!(
            result.details(),
            "Calculation: Annual Rate 10.2%, Term 3 years, Tax Rate 15% (Non-TIN Holder)"
        );
    }

    #[test]
    fn test_rate_override_wins() {
        let table = RateTable::default();
        let input = FdrInput::for_product(
            &table,
            ProductCode::OneMonth,
            Some(dec!(50000)),
            Some(dec!(5.5)),
            Some(TaxStatus::TinHolder),
        )
        .unwrap();
        assert_eq!(input.annual_rate_percent, Some(dec!(5.5)));
    }

    #[rstest]
    #[case("yes", TaxStatus::TinHolder)]
    #[case("No", TaxStatus::NonTinHolder)]
    fn test_parse_tax_status(#[case] input: &str, #[case] expected: TaxStatus) {
        assert_eq!(input.parse::<TaxStatus>().unwrap(), expected);
    }
}
