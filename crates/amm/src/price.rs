//! Exchange rates between two assets.

use crate::amount::Amount;
use crate::asset::Asset;
use crate::error::{AmmError, Result};
use crate::fraction::{ExactFraction, Rounding};
use num_bigint::BigInt;
use std::fmt;

/// How much of the quote asset one unit of the base asset is worth.
///
/// The ratio is stored over raw (smallest-unit) quantities. [`Price::adjusted`]
/// applies the decimal difference between the two assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    base: Asset,
    quote: Asset,
    ratio: ExactFraction,
}

impl Price {
    /// `quote_raw / base_raw` units of quote per unit of base.
    pub fn new(
        base: impl Into<Asset>,
        quote: impl Into<Asset>,
        base_raw: impl Into<BigInt>,
        quote_raw: impl Into<BigInt>,
    ) -> Result<Self> {
        Ok(Self {
            base: base.into(),
            quote: quote.into(),
            ratio: ExactFraction::new(quote_raw, base_raw)?,
        })
    }

    /// The price implied by exchanging `base_amount` for `quote_amount`.
    pub fn from_amounts(base_amount: &Amount, quote_amount: &Amount) -> Result<Self> {
        Self::new(
            base_amount.asset().clone(),
            quote_amount.asset().clone(),
            base_amount.raw().clone(),
            quote_amount.raw().clone(),
        )
    }

    pub fn base_asset(&self) -> &Asset {
        &self.base
    }

    pub fn quote_asset(&self) -> &Asset {
        &self.quote
    }

    /// Ratio of raw quantities, without decimal adjustment.
    pub fn raw(&self) -> &ExactFraction {
        &self.ratio
    }

    /// Ratio of human-readable quantities.
    pub fn adjusted(&self) -> ExactFraction {
        let ten = BigInt::from(10u8);
        let scalar = ExactFraction::new_unchecked(
            ten.pow(u32::from(self.base.decimals())),
            ten.pow(u32::from(self.quote.decimals())),
        );
        &self.ratio * &scalar
    }

    /// The same rate seen from the other side.
    pub fn invert(&self) -> Result<Price> {
        Ok(Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
            ratio: self.ratio.invert()?,
        })
    }

    /// Chain `self` (A→B) with `other` (B→C) into A→C.
    pub fn multiply(&self, other: &Price) -> Result<Price> {
        if self.quote != other.base {
            return Err(AmmError::AssetMismatch {
                expected: self.quote.to_string(),
                actual: other.base.to_string(),
            });
        }
        Ok(Self {
            base: self.base.clone(),
            quote: other.quote.clone(),
            ratio: &self.ratio * &other.ratio,
        })
    }

    /// Convert an amount of the base asset into the quote asset, truncating.
    pub fn quote(&self, amount: &Amount) -> Result<Amount> {
        if *amount.asset() != self.base {
            return Err(AmmError::AssetMismatch {
                expected: self.base.to_string(),
                actual: amount.asset().to_string(),
            });
        }
        let converted = &amount.as_fraction() * &self.ratio;
        Amount::from_raw(self.quote.clone(), converted.quotient())
    }

    pub fn to_fixed(&self, decimal_places: u32, rounding: Rounding) -> String {
        self.adjusted().to_fixed(decimal_places, rounding)
    }

    pub fn to_significant(&self, significant_digits: u32, rounding: Rounding) -> String {
        self.adjusted().to_significant(significant_digits, rounding)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.to_significant(6, Rounding::HalfUp),
            self.quote,
            self.base
        )
    }
}
