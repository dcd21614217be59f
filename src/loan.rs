//! Equal Monthly Installment loans.
//!
//! The installment follows the standard amortization formula
//! `EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r` the nominal annual
//! rate divided by twelve. At `r = 0` the formula divides by zero, so the
//! loan is repaid linearly instead: `EMI = P / n`. When `(1 + r)^n` is too
//! large to represent, the installment has converged to the interest alone,
//! `EMI = P * r`.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{in_range, require_positive, CalcError, Result};
use crate::format::format_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Months,
    Years,
}

impl FromStr for PeriodUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "months" | "month" | "m" => Ok(PeriodUnit::Months),
            "years" | "year" | "y" => Ok(PeriodUnit::Years),
            other => Err(CalcError::invalid(
                "period_type",
                format!("expected 'months' or 'years', got '{other}'"),
            )),
        }
    }
}

/// Input parameters for an EMI calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Option<Decimal>,
    /// The annual interest rate as a percentage (e.g., 8.75 for 8.75%).
    pub annual_rate_percent: Option<Decimal>,
    pub period: Option<u32>,
    pub period_unit: PeriodUnit,
    /// Charged once on top of the repayments. Blank or negative means zero.
    pub processing_fee: Option<Decimal>,
}

/// Represents the payment details for a single month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthPayment {
    pub month: u32,
    /// The remaining balance of the loan after the payment.
    pub new_balance: Decimal,
    /// The portion of the payment that goes towards reducing the principal.
    pub current_amortization: Decimal,
    /// The portion of the payment that covers interest.
    pub current_interest: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanResult {
    pub principal: Decimal,
    pub total_months: u32,
    /// Monthly rate as a fraction, not a percentage.
    pub monthly_rate: Decimal,
    pub emi: Decimal,
    pub total_payment: Decimal,
    pub total_interest: Decimal,
    pub processing_fee: Decimal,
    pub grand_total: Decimal,
}

impl LoanResult {
    pub fn details(&self) -> String {
        let mut rate = self
            .monthly_rate
            .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero);
        rate.rescale(6);
        format!(
            "EMI Formula: P×r×(1+r)^n/((1+r)^n-1) where P={}, r={}, n={}",
            format_amount(self.principal),
            rate,
            self.total_months
        )
    }

    /// Month-by-month split of each installment into interest and principal.
    pub fn amortization_schedule(&self) -> Vec<MonthPayment> {
        let mut current_balance = self.principal;
        let mut schedule = Vec::with_capacity(self.total_months as usize);

        for month in 1..=self.total_months {
            let interest_payment = current_balance * self.monthly_rate;
            let amortization = self.emi - interest_payment;
            current_balance -= amortization;
            schedule.push(MonthPayment {
                month,
                new_balance: current_balance.max(Decimal::ZERO),
                current_amortization: amortization,
                current_interest: interest_payment,
            });
        }
        schedule
    }
}

/// Converts a nominal annual percentage into a monthly fraction.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(100) / dec!(12)
}

/// The equal installment for `principal` over `total_months`.
///
/// # Errors
///
/// Returns an error if `total_months` is zero or the installment does not
/// fit in a `Decimal`.
pub fn calculate_emi(principal: Decimal, monthly_rate: Decimal, total_months: u32) -> Result<Decimal> {
    if total_months == 0 {
        tracing::debug!("rejected zero-month loan");
        return Err(CalcError::invalid("loan_period", "cannot be zero months"));
    }
    let linear = principal / Decimal::from(total_months);
    if monthly_rate.is_zero() {
        return Ok(linear);
    }

    let interest = in_range("loan_amount", principal.checked_mul(monthly_rate))?;
    let Some(factor) = in_range("interest_rate", dec!(1).checked_add(monthly_rate))?
        .checked_powu(total_months.into())
    else {
        return Ok(interest);
    };
    // A rate too small to move `1 + r` behaves like no interest at all.
    let Some(ratio) = factor.checked_div(factor - dec!(1)) else {
        return Ok(linear);
    };
    in_range("loan_amount", interest.checked_mul(ratio))
}

/// Computes installment, totals and the fee-inclusive grand total.
///
/// # Errors
///
/// Returns an error if principal, rate or period is missing or not positive,
/// or if the totals do not fit in a `Decimal`.
pub fn calculate_loan(input: LoanInput) -> Result<LoanResult> {
    let principal = require_positive("loan_amount", input.principal)?;
    let annual_rate_percent = require_positive("interest_rate", input.annual_rate_percent)?;
    let period = match input.period {
        None => {
            tracing::debug!("loan period left blank");
            return Err(CalcError::MissingField("loan_period"));
        }
        Some(0) => {
            tracing::debug!("rejected zero loan period");
            return Err(CalcError::invalid("loan_period", "must be greater than zero"));
        }
        Some(p) => p,
    };
    let total_months = match input.period_unit {
        PeriodUnit::Months => period,
        PeriodUnit::Years => period
            .checked_mul(12)
            .ok_or_else(|| CalcError::invalid("loan_period", "too long"))?,
    };
    let processing_fee = input
        .processing_fee
        .filter(|fee| *fee > Decimal::ZERO)
        .unwrap_or(Decimal::ZERO);

    let monthly_rate = monthly_rate(annual_rate_percent);
    let emi = calculate_emi(principal, monthly_rate, total_months)?;
    let total_payment = in_range("loan_amount", emi.checked_mul(Decimal::from(total_months)))?;
    let total_interest = in_range("loan_amount", total_payment.checked_sub(principal))?;
    let grand_total = in_range("processing_fee", total_payment.checked_add(processing_fee))?;

    Ok(LoanResult {
        principal,
        total_months,
        monthly_rate,
        emi,
        total_payment,
        total_interest,
        processing_fee,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn one_lakh(rate: Decimal, period: u32, unit: PeriodUnit, fee: Option<Decimal>) -> LoanInput {
        LoanInput {
            principal: Some(dec!(100000)),
            annual_rate_percent: Some(rate),
            period: Some(period),
            period_unit: unit,
            processing_fee: fee,
        }
    }

    #[test]
    fn test_one_lakh_for_a_year() {
        let result = calculate_loan(one_lakh(dec!(8.75), 12, PeriodUnit::Months, None)).unwrap();

        assert_eq!(result.monthly_rate.round_dp(10), dec!(0.0072916667));
        assert_eq!(result.emi.round_dp(2), dec!(8733.56));
        assert_eq!(result.total_payment.round_dp(2), dec!(104802.70));
        assert_eq!(result.total_interest.round_dp(2), dec!(4802.70));
        assert_eq!(result.processing_fee, dec!(0));
        assert_eq!(result.grand_total, result.total_payment);
    }

    #[test]
    fn test_totals_are_consistent() {
        let result = calculate_loan(one_lakh(dec!(12), 3, PeriodUnit::Years, Some(dec!(1500)))).unwrap();

        assert_eq!(result.total_months, 36);
        assert_eq!(result.total_payment, result.emi * dec!(36));
        assert_eq!(result.total_payment - result.principal, result.total_interest);
        assert_eq!(result.grand_total - result.total_payment, dec!(1500));
    }

    #[test]
    fn test_zero_rate_is_linear() {
        let emi = calculate_emi(dec!(120000), dec!(0), 12).unwrap();
        assert_eq!(emi, dec!(10000));
    }

    #[test]
    fn test_zero_months_error() {
        assert!(calculate_emi(dec!(100000), dec!(0.01), 0).is_err());
    }

    #[rstest]
    #[case(None, Some(dec!(9)), Some(12))]
    #[case(Some(dec!(1000)), None, Some(12))]
    #[case(Some(dec!(1000)), Some(dec!(0)), Some(12))]
    #[case(Some(dec!(1000)), Some(dec!(9)), None)]
    #[case(Some(dec!(1000)), Some(dec!(9)), Some(0))]
    fn test_rejects_incomplete_input(
        #[case] principal: Option<Decimal>,
        #[case] rate: Option<Decimal>,
        #[case] period: Option<u32>,
    ) {
        let input = LoanInput {
            principal,
            annual_rate_percent: rate,
            period,
            period_unit: PeriodUnit::Months,
            processing_fee: None,
        };
        assert!(calculate_loan(input).is_err());
    }

    #[test]
    fn test_very_long_loan_pays_interest_only() {
        let result = calculate_loan(one_lakh(dec!(12), 1000, PeriodUnit::Years, None)).unwrap();
        assert_eq!(result.total_months, 12000);
        assert_eq!(result.emi, dec!(1000));
    }

    #[test]
    fn test_long_loan_converges_to_interest() {
        let emi = calculate_emi(dec!(100000), dec!(0.01), 1200).unwrap();
        assert_eq!(emi.round_dp(2), dec!(1000.01));
    }

    #[test]
    fn test_smallest_rate_is_nearly_linear() {
        let emi = calculate_emi(dec!(1200), Decimal::new(1, 28), 12).unwrap();
        assert_eq!(emi.round_dp(10), dec!(100));
    }

    #[test]
    fn test_large_principal_over_a_century() {
        let input = LoanInput {
            principal: Some(dec!(100000000000000000000000000)),
            annual_rate_percent: Some(dec!(12)),
            period: Some(100),
            period_unit: PeriodUnit::Years,
            processing_fee: None,
        };
        let result = calculate_loan(input).unwrap();
        assert!((result.emi - dec!(1000006521602029112185569)).abs() < dec!(1));
    }

    #[rstest]
    #[case(dec!(79000000000000000000000000000), dec!(12))]
    #[case(dec!(100000), dec!(9000000000000000000000000000))]
    fn test_huge_loans_are_rejected(#[case] principal: Decimal, #[case] rate: Decimal) {
        let input = LoanInput {
            principal: Some(principal),
            annual_rate_percent: Some(rate),
            period: Some(1),
            period_unit: PeriodUnit::Years,
            processing_fee: None,
        };
        assert!(matches!(
            calculate_loan(input),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_fee_overflow_is_rejected() {
        let result = calculate_loan(one_lakh(dec!(10), 6, PeriodUnit::Months, Some(Decimal::MAX)));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_fee_counts_as_zero() {
        let result = calculate_loan(one_lakh(dec!(10), 6, PeriodUnit::Months, Some(dec!(-50)))).unwrap();
        assert_eq!(result.processing_fee, dec!(0));
    }

    #[test]
    fn test_schedule_pays_off_the_loan() {
        let result = calculate_loan(one_lakh(dec!(12), 12, PeriodUnit::Months, None)).unwrap();
        let schedule = result.amortization_schedule();

        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule[0].current_interest.round_dp(2), dec!(1000.00));
        assert_eq!(schedule.last().unwrap().new_balance.round_dp(2), dec!(0.00));

        let repaid: Decimal = schedule.iter().map(|m| m.current_amortization).sum();
        assert_eq!(repaid.round_dp(2), dec!(100000.00));
    }

    #[test]
    fn test_details_line() {
        let result = calculate_loan(one_lakh(dec!(8.75), 12, PeriodUnit::Months, None)).unwrap();
        assert_eq!(
            result.details(),
            "EMI Formula: P×r×(1+r)^n/((1+r)^n-1) where P=1,00,000, r=0.007292, n=12"
        );
    }
}
