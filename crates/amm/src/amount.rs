//! Asset-denominated quantities.

use crate::asset::Asset;
use crate::error::{AmmError, Result};
use crate::fraction::{ExactFraction, Rounding};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::fmt;

/// A non-negative quantity of an asset, in the asset's smallest unit.
///
/// Arithmetic between amounts is only defined for the same asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    asset: Asset,
    raw: BigInt,
}

impl Amount {
    /// Wrap a raw integer quantity (e.g. wei).
    pub fn from_raw(asset: impl Into<Asset>, raw: impl Into<BigInt>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_negative() {
            return Err(AmmError::NegativeAmount);
        }
        Ok(Self {
            asset: asset.into(),
            raw,
        })
    }

    pub fn zero(asset: impl Into<Asset>) -> Self {
        Self {
            asset: asset.into(),
            raw: BigInt::zero(),
        }
    }

    /// Parse a human readable decimal string such as `"1.5"`, scaling it by
    /// the asset's decimals. More fractional digits than the asset supports is
    /// an error rather than a silent truncation.
    pub fn parse(asset: impl Into<Asset>, value: &str) -> Result<Self> {
        let asset = asset.into();
        let decimals = usize::from(asset.decimals());
        let invalid = |reason: &str| AmmError::InvalidAmount(format!("{value:?}: {reason}"));

        let (whole, fractional) = value.split_once('.').unwrap_or((value, ""));
        if whole.is_empty() && fractional.is_empty() {
            return Err(invalid("empty"));
        }
        if !whole.chars().chain(fractional.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a non-negative decimal number"));
        }
        if fractional.len() > decimals {
            return Err(invalid("too many fractional digits"));
        }

        let digits = format!("{whole}{fractional}{}", "0".repeat(decimals - fractional.len()));
        let raw = digits
            .parse::<BigInt>()
            .map_err(|_| invalid("not a number"))?;
        Self::from_raw(asset, raw)
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn raw(&self) -> &BigInt {
        &self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.raw.is_positive()
    }

    /// The raw quantity as a fraction, without decimal adjustment.
    pub fn as_fraction(&self) -> ExactFraction {
        ExactFraction::from_integer(self.raw.clone())
    }

    /// `raw / 10^decimals`.
    pub fn value(&self) -> ExactFraction {
        let scale = BigInt::from(10u8).pow(u32::from(self.asset.decimals()));
        ExactFraction::new_unchecked(self.raw.clone(), scale)
    }

    pub fn add(&self, other: &Amount) -> Result<Amount> {
        self.ensure_same_asset(other)?;
        Ok(Self {
            asset: self.asset.clone(),
            raw: &self.raw + &other.raw,
        })
    }

    pub fn subtract(&self, other: &Amount) -> Result<Amount> {
        self.ensure_same_asset(other)?;
        Self::from_raw(self.asset.clone(), &self.raw - &other.raw)
    }

    /// Scale by `scalar`, truncating the result to whole units.
    pub fn multiply(&self, scalar: &ExactFraction) -> Result<Amount> {
        let scaled = &self.as_fraction() * scalar;
        Self::from_raw(self.asset.clone(), scaled.quotient())
    }

    /// Divide by `scalar`, truncating the result to whole units.
    pub fn divide(&self, scalar: &ExactFraction) -> Result<Amount> {
        let scaled = self.as_fraction().checked_div(scalar)?;
        Self::from_raw(self.asset.clone(), scaled.quotient())
    }

    /// Full-precision decimal string with trailing zeros removed.
    pub fn to_exact(&self) -> String {
        let fixed = self.value().to_fixed(u32::from(self.asset.decimals()), Rounding::Down);
        if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        }
    }

    pub fn to_fixed(&self, decimal_places: u32, rounding: Rounding) -> String {
        self.value().to_fixed(decimal_places, rounding)
    }

    pub fn to_significant(&self, significant_digits: u32, rounding: Rounding) -> String {
        self.value().to_significant(significant_digits, rounding)
    }

    pub(crate) fn ensure_same_asset(&self, other: &Amount) -> Result<()> {
        if self.asset != other.asset {
            return Err(AmmError::AssetMismatch {
                expected: self.asset.to_string(),
                actual: other.asset.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_exact(), self.asset)
    }
}
