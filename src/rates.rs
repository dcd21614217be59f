//! Tiered fixed-deposit rates.
//!
//! Each deposit product owns an ordered list of amount bands. A band covers
//! `(min, max]`: lower bound exclusive, upper bound inclusive, so an amount
//! sitting exactly on a boundary belongs to the band that ends there. The
//! top band of a well-formed product has no upper bound.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CalcError, Result};
use crate::format::{format_amount, CURRENCY_SIGN};

/// Deposit products offered at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductCode {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "2month")]
    TwoMonth,
    #[serde(rename = "3month")]
    ThreeMonth,
    #[serde(rename = "75days")]
    SeventyFiveDays,
    #[serde(rename = "100days")]
    HundredDays,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "mis1year")]
    Mis1Year,
    #[serde(rename = "mis3year")]
    Mis3Year,
    #[serde(rename = "mis5year")]
    Mis5Year,
}

impl ProductCode {
    pub const ALL: [ProductCode; 9] = [
        ProductCode::OneMonth,
        ProductCode::TwoMonth,
        ProductCode::ThreeMonth,
        ProductCode::SeventyFiveDays,
        ProductCode::HundredDays,
        ProductCode::SixMonths,
        ProductCode::Mis1Year,
        ProductCode::Mis3Year,
        ProductCode::Mis5Year,
    ];

    /// The code used in settings documents.
    pub fn code(self) -> &'static str {
        match self {
            ProductCode::OneMonth => "1month",
            ProductCode::TwoMonth => "2month",
            ProductCode::ThreeMonth => "3month",
            ProductCode::SeventyFiveDays => "75days",
            ProductCode::HundredDays => "100days",
            ProductCode::SixMonths => "6months",
            ProductCode::Mis1Year => "mis1year",
            ProductCode::Mis3Year => "mis3year",
            ProductCode::Mis5Year => "mis5year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductCode::OneMonth => "1 Month",
            ProductCode::TwoMonth => "2 Month",
            ProductCode::ThreeMonth => "3 Month",
            ProductCode::SeventyFiveDays => "75 Days",
            ProductCode::HundredDays => "100 Days",
            ProductCode::SixMonths => "6 Months",
            ProductCode::Mis1Year => "MIS 1 Year",
            ProductCode::Mis3Year => "MIS 3 Year",
            ProductCode::Mis5Year => "MIS 5 Years",
        }
    }

    /// Deposit term in years. Day-counted products use a 365-day year.
    pub fn term_years(self) -> Decimal {
        match self {
            ProductCode::OneMonth => dec!(1) / dec!(12),
            ProductCode::TwoMonth => dec!(2) / dec!(12),
            ProductCode::ThreeMonth => dec!(3) / dec!(12),
            ProductCode::SeventyFiveDays => dec!(75) / dec!(365),
            ProductCode::HundredDays => dec!(100) / dec!(365),
            ProductCode::SixMonths => dec!(6) / dec!(12),
            ProductCode::Mis1Year => dec!(1),
            ProductCode::Mis3Year => dec!(3),
            ProductCode::Mis5Year => dec!(5),
        }
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ProductCode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        ProductCode::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CalcError::UnknownProduct(s.to_string()))
    }
}

/// One amount band. `max == None` means the band is unbounded above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub min: Decimal,
    pub max: Option<Decimal>,
    /// Annual rate in percent.
    pub rate: Decimal,
}

impl RateBand {
    pub fn new(min: Decimal, max: Option<Decimal>, rate: Decimal) -> Self {
        Self { min, max, rate }
    }

    pub fn contains(&self, amount: Decimal) -> bool {
        amount > self.min && self.max.is_none_or(|max| amount <= max)
    }
}

/// Rate bands for every product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    products: BTreeMap<ProductCode, Vec<RateBand>>,
}

impl Default for RateTable {
    fn default() -> Self {
        let lakh10 = dec!(1_000_000);
        let lakh50 = dec!(5_000_000);
        let two_tier = |low: Decimal, high: Decimal| {
            vec![
                RateBand::new(dec!(0), Some(lakh10), low),
                RateBand::new(lakh10, None, high),
            ]
        };
        let flat = |rate: Decimal| vec![RateBand::new(dec!(0), None, rate)];

        let products = BTreeMap::from([
            (ProductCode::OneMonth, two_tier(dec!(4.0), dec!(4.25))),
            (ProductCode::TwoMonth, two_tier(dec!(4.5), dec!(4.75))),
            (ProductCode::ThreeMonth, two_tier(dec!(8.5), dec!(8.75))),
            (ProductCode::SeventyFiveDays, flat(dec!(8.5))),
            (ProductCode::HundredDays, flat(dec!(8.75))),
            (
                ProductCode::SixMonths,
                vec![
                    RateBand::new(dec!(0), Some(lakh10), dec!(8.75)),
                    RateBand::new(lakh10, Some(lakh50), dec!(9.0)),
                    RateBand::new(lakh50, None, dec!(9.5)),
                ],
            ),
            (ProductCode::Mis1Year, flat(dec!(10.8))),
            (ProductCode::Mis3Year, flat(dec!(10.2))),
            (ProductCode::Mis5Year, flat(dec!(9.9))),
        ]);

        RateTable { products }
    }
}

impl RateTable {
    /// Builds a table from explicit bands, e.g. when restoring settings.
    pub fn from_bands(products: BTreeMap<ProductCode, Vec<RateBand>>) -> Self {
        RateTable { products }
    }

    pub fn bands(&self, product: ProductCode) -> &[RateBand] {
        self.products.get(&product).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductCode, &[RateBand])> {
        self.products.iter().map(|(p, bands)| (*p, bands.as_slice()))
    }

    /// Annual percent rate for depositing `amount` in `product`.
    ///
    /// The first band containing the amount wins. An amount above every
    /// band, which only happens when the top band is capped, gets the top
    /// band's rate.
    pub fn resolve_rate(&self, product: ProductCode, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(CalcError::invalid("amount", "must be greater than zero"));
        }
        let bands = self.bands(product);
        let last = bands.last().ok_or(CalcError::NoRateBands(product))?;

        let band = bands.iter().find(|b| b.contains(amount)).unwrap_or_else(|| {
            tracing::debug!(%product, %amount, "amount outside every band, using top band");
            last
        });
        Ok(band.rate)
    }

    /// Replaces one band's rate. Coverage and ordering are not rechecked.
    pub fn set_rate(&mut self, product: ProductCode, index: usize, rate: Decimal) -> Result<()> {
        let band = self
            .products
            .get_mut(&product)
            .and_then(|bands| bands.get_mut(index))
            .ok_or(CalcError::BandOutOfRange { product, index })?;
        tracing::debug!(%product, index, old = %band.rate, new = %rate, "rate updated");
        band.rate = rate;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = RateTable::default();
    }

    /// Settings-screen caption for a band, e.g. `6 Months (৳10,00,000 - ৳50,00,000)`.
    pub fn range_label(product: ProductCode, band: &RateBand) -> String {
        match band.max {
            Some(max) => format!(
                "{} ({}{} - {}{})",
                product.label(),
                CURRENCY_SIGN,
                format_amount(band.min),
                CURRENCY_SIGN,
                format_amount(max)
            ),
            None => format!(
                "{} (Above {}{})",
                product.label(),
                CURRENCY_SIGN,
                format_amount(band.min)
            ),
        }
    }
}
