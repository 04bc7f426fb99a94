//! Exact rational arithmetic.
//!
//! Every amount, price and pool computation in this crate goes through
//! [`ExactFraction`]. There is no floating point anywhere in the pipeline;
//! rendering to decimal strings is for display only.

use crate::error::{AmmError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Rounding applied when rendering a fraction with limited precision.
///
/// Rounding acts on the magnitude, so `Down` truncates toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    #[default]
    Down,
    HalfUp,
    Up,
}

/// An arbitrary-precision rational number.
///
/// Fractions are never normalised implicitly: `2/4` stays `2/4`. Equality and
/// ordering cross-multiply, so `2/4 == 1/2`. The denominator is always
/// positive; the sign lives on the numerator.
#[derive(Debug, Clone)]
pub struct ExactFraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl ExactFraction {
    /// Create a fraction. Fails with [`AmmError::DivisionByZero`] on a zero denominator.
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self> {
        let numerator = numerator.into();
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(AmmError::DivisionByZero);
        }
        if denominator.is_negative() {
            return Ok(Self {
                numerator: -numerator,
                denominator: -denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Build from a denominator the caller knows to be positive.
    pub(crate) fn new_unchecked(numerator: BigInt, denominator: BigInt) -> Self {
        debug_assert!(denominator.is_positive());
        Self {
            numerator,
            denominator,
        }
    }

    /// The fraction `value / 1`.
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            numerator: value.into(),
            denominator: BigInt::one(),
        }
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    pub fn abs(&self) -> Self {
        Self {
            numerator: self.numerator.abs(),
            denominator: self.denominator.clone(),
        }
    }

    /// Truncating integer division of numerator by denominator (toward zero).
    pub fn quotient(&self) -> BigInt {
        &self.numerator / &self.denominator
    }

    /// What is left over after [`quotient`](Self::quotient), as a fraction of the
    /// same denominator.
    pub fn remainder(&self) -> Self {
        Self {
            numerator: &self.numerator % &self.denominator,
            denominator: self.denominator.clone(),
        }
    }

    /// Swap numerator and denominator.
    pub fn invert(&self) -> Result<Self> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    /// Divide by `other`, failing if `other` is zero.
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(AmmError::DivisionByZero);
        }
        Self::new(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        )
    }

    /// The same value in lowest terms.
    pub fn reduced(&self) -> Self {
        let gcd = self.numerator.gcd(&self.denominator);
        if gcd.is_zero() || gcd.is_one() {
            return self.clone();
        }
        Self {
            numerator: &self.numerator / &gcd,
            denominator: &self.denominator / &gcd,
        }
    }

    pub fn less_than(&self, other: &Self) -> bool {
        self < other
    }

    pub fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    pub fn greater_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Render with exactly `decimal_places` digits after the point.
    pub fn to_fixed(&self, decimal_places: u32, rounding: Rounding) -> String {
        let scale = BigInt::from(10u8).pow(decimal_places);
        let magnitude = round_div(&(self.numerator.abs() * scale), &self.denominator, rounding);
        let mut digits = magnitude.to_string();
        if decimal_places > 0 {
            let width = decimal_places as usize + 1;
            if digits.len() < width {
                digits = format!("{}{}", "0".repeat(width - digits.len()), digits);
            }
            digits.insert(digits.len() - decimal_places as usize, '.');
        }
        with_sign(self.is_negative() && !magnitude.is_zero(), digits)
    }

    /// Render with at most `significant_digits` significant digits, dropping
    /// trailing zeros in the fractional part.
    pub fn to_significant(&self, significant_digits: u32, rounding: Rounding) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let significant_digits = i64::from(significant_digits.max(1));
        let numerator = self.numerator.abs();
        let decimals = significant_digits - 1 - decimal_exponent(&numerator, &self.denominator);

        if decimals >= 0 {
            let fixed = self.abs().to_fixed(decimals as u32, rounding);
            let trimmed = if fixed.contains('.') {
                fixed.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                fixed
            };
            let is_zero = trimmed.chars().all(|c| c == '0' || c == '.');
            return with_sign(self.is_negative() && !is_zero, trimmed);
        }

        let unit = BigInt::from(10u8).pow((-decimals) as u32);
        let magnitude = round_div(&numerator, &(&self.denominator * &unit), rounding) * unit;
        with_sign(self.is_negative() && !magnitude.is_zero(), magnitude.to_string())
    }
}

/// `floor(log10(numerator / denominator))` for a positive value.
fn decimal_exponent(numerator: &BigInt, denominator: &BigInt) -> i64 {
    let integer = numerator / denominator;
    if !integer.is_zero() {
        return integer.to_string().len() as i64 - 1;
    }
    let ten = BigInt::from(10u8);
    let mut scaled = numerator.clone();
    let mut exponent = 0i64;
    while &scaled < denominator {
        scaled *= &ten;
        exponent -= 1;
    }
    exponent
}

/// Divide two non-negative integers with the requested rounding.
fn round_div(numerator: &BigInt, denominator: &BigInt, rounding: Rounding) -> BigInt {
    let (quotient, remainder) = numerator.div_rem(denominator);
    if remainder.is_zero() {
        return quotient;
    }
    match rounding {
        Rounding::Down => quotient,
        Rounding::Up => quotient + 1,
        Rounding::HalfUp => {
            if remainder * 2 >= *denominator {
                quotient + 1
            } else {
                quotient
            }
        }
    }
}

fn with_sign(negative: bool, digits: String) -> String {
    if negative {
        format!("-{digits}")
    } else {
        digits
    }
}

impl PartialEq for ExactFraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExactFraction {}

impl PartialOrd for ExactFraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExactFraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying preserves order.
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl Add for &ExactFraction {
    type Output = ExactFraction;

    fn add(self, other: &ExactFraction) -> ExactFraction {
        if self.denominator == other.denominator {
            return ExactFraction {
                numerator: &self.numerator + &other.numerator,
                denominator: self.denominator.clone(),
            };
        }
        ExactFraction {
            numerator: &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            denominator: &self.denominator * &other.denominator,
        }
    }
}

impl Sub for &ExactFraction {
    type Output = ExactFraction;

    fn sub(self, other: &ExactFraction) -> ExactFraction {
        self + &(-other)
    }
}

impl Mul for &ExactFraction {
    type Output = ExactFraction;

    fn mul(self, other: &ExactFraction) -> ExactFraction {
        ExactFraction {
            numerator: &self.numerator * &other.numerator,
            denominator: &self.denominator * &other.denominator,
        }
    }
}

impl Neg for &ExactFraction {
    type Output = ExactFraction;

    fn neg(self) -> ExactFraction {
        ExactFraction {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

impl Add for ExactFraction {
    type Output = ExactFraction;

    fn add(self, other: ExactFraction) -> ExactFraction {
        &self + &other
    }
}

impl Sub for ExactFraction {
    type Output = ExactFraction;

    fn sub(self, other: ExactFraction) -> ExactFraction {
        &self - &other
    }
}

impl Mul for ExactFraction {
    type Output = ExactFraction;

    fn mul(self, other: ExactFraction) -> ExactFraction {
        &self * &other
    }
}

impl From<BigInt> for ExactFraction {
    fn from(value: BigInt) -> Self {
        Self::from_integer(value)
    }
}

impl From<u64> for ExactFraction {
    fn from(value: u64) -> Self {
        Self::from_integer(value)
    }
}

impl fmt::Display for ExactFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// A fraction interpreted as a percentage (`1/100` is 1%).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(ExactFraction);

impl Percent {
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Result<Self> {
        ExactFraction::new(numerator, denominator).map(Self)
    }

    /// `bps / 10000`, e.g. 50 bps is 0.5%.
    pub fn from_bps(bps: u32) -> Self {
        Self(ExactFraction {
            numerator: BigInt::from(bps),
            denominator: BigInt::from(10_000u32),
        })
    }

    pub fn as_fraction(&self) -> &ExactFraction {
        &self.0
    }

    pub fn into_fraction(self) -> ExactFraction {
        self.0
    }

    /// Render as a percentage number, e.g. `1/200` renders as `0.50`.
    pub fn to_fixed(&self, decimal_places: u32, rounding: Rounding) -> String {
        (&self.0 * &ExactFraction::from_integer(100)).to_fixed(decimal_places, rounding)
    }

    pub fn to_significant(&self, significant_digits: u32, rounding: Rounding) -> String {
        (&self.0 * &ExactFraction::from_integer(100)).to_significant(significant_digits, rounding)
    }
}

impl From<ExactFraction> for Percent {
    fn from(value: ExactFraction) -> Self {
        Self(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.to_significant(4, Rounding::HalfUp))
    }
}
