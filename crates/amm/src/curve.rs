//! Swap invariants a [`Pool`](crate::pool::Pool) can be built with.
//!
//! A curve only sees raw integers. The pool has already checked that both
//! reserves are positive, that the amount is positive and, for the inverse
//! direction, that the requested output is below the output reserve.

use crate::error::{AmmError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::fmt;
use std::sync::Arc;

/// Basis-point denominator for fees.
pub const FEE_DENOMINATOR: u32 = 10_000;

/// The reserves and parameters relevant to one swap direction.
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    pub reserve_in: &'a BigInt,
    pub reserve_out: &'a BigInt,
    pub fee_bps: u16,
    pub weight_in: u8,
    pub weight_out: u8,
}

impl Leg<'_> {
    /// `10000 - fee`, the share of the input that reaches the reserves.
    fn fee_complement(&self) -> BigInt {
        BigInt::from(FEE_DENOMINATOR - u32::from(self.fee_bps))
    }
}

/// A pluggable exchange invariant.
pub trait SwapCurve: fmt::Debug + Send + Sync {
    /// Output received for `amount_in`, rounded down.
    fn output_amount(&self, leg: &Leg<'_>, amount_in: &BigInt) -> Result<BigInt>;

    /// Input required to receive `amount_out`, rounded so that it is never
    /// under-priced.
    fn input_amount(&self, leg: &Leg<'_>, amount_out: &BigInt) -> Result<BigInt>;
}

/// `x · y = k` with the fee taken from the input. Weights are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantProduct;

impl SwapCurve for ConstantProduct {
    fn output_amount(&self, leg: &Leg<'_>, amount_in: &BigInt) -> Result<BigInt> {
        let amount_in_with_fee = amount_in * leg.fee_complement();
        let numerator = &amount_in_with_fee * leg.reserve_out;
        let denominator = leg.reserve_in * BigInt::from(FEE_DENOMINATOR) + &amount_in_with_fee;
        Ok(numerator / denominator)
    }

    fn input_amount(&self, leg: &Leg<'_>, amount_out: &BigInt) -> Result<BigInt> {
        let numerator = leg.reserve_in * amount_out * BigInt::from(FEE_DENOMINATOR);
        let denominator = (leg.reserve_out - amount_out) * leg.fee_complement();
        if denominator.is_zero() {
            return Err(AmmError::InsufficientReserves);
        }
        Ok(numerator / denominator + 1)
    }
}

/// Weighted invariant `x^wx · y^wy = k`, solved exactly over integers.
///
/// Weights are reduced by their gcd before exponentiation, so 50/50 pools use
/// exponents 1/1 and quote exactly like [`ConstantProduct`] in both
/// directions. Other weights are solved by bisection on the invariant, which
/// keeps every step in integer arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedProduct;

impl WeightedProduct {
    fn exponents(leg: &Leg<'_>) -> (u32, u32) {
        let gcd = leg.weight_in.gcd(&leg.weight_out).max(1);
        (
            u32::from(leg.weight_in / gcd),
            u32::from(leg.weight_out / gcd),
        )
    }
}

impl SwapCurve for WeightedProduct {
    fn output_amount(&self, leg: &Leg<'_>, amount_in: &BigInt) -> Result<BigInt> {
        let (a, b) = Self::exponents(leg);
        // Scale the input side by the fee denominator so the fee stays integral.
        let x0 = leg.reserve_in * BigInt::from(FEE_DENOMINATOR);
        let x1 = &x0 + amount_in * leg.fee_complement();
        let k = x0.pow(a) * leg.reserve_out.pow(b);
        let lhs = x1.pow(a);

        // Largest `out` with x1^a · (y0 - out)^b >= k.
        let mut lo = BigInt::zero();
        let mut hi = leg.reserve_out - 1;
        while lo < hi {
            let mid: BigInt = (&lo + &hi + 1) >> 1;
            if &lhs * (leg.reserve_out - &mid).pow(b) >= k {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        Ok(lo)
    }

    fn input_amount(&self, leg: &Leg<'_>, amount_out: &BigInt) -> Result<BigInt> {
        let (a, b) = Self::exponents(leg);
        if (a, b) == (1, 1) {
            // Even pools quote inputs as floor + 1, not the exact ceiling.
            return ConstantProduct.input_amount(leg, amount_out);
        }
        let x0 = leg.reserve_in * BigInt::from(FEE_DENOMINATOR);
        let k = x0.pow(a) * leg.reserve_out.pow(b);
        let rhs = (leg.reserve_out - amount_out).pow(b);
        if rhs.is_zero() {
            return Err(AmmError::InsufficientReserves);
        }
        let holds = |scaled_in: &BigInt| (&x0 + scaled_in).pow(a) * &rhs >= k;

        // Smallest scaled input that keeps the invariant: grow an upper bound,
        // then bisect.
        let mut hi = BigInt::one();
        while !holds(&hi) {
            hi <<= 1;
        }
        let mut lo = &hi >> 1;
        while lo < hi {
            let mid: BigInt = (&lo + &hi) >> 1;
            if holds(&mid) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        // Undo the fee scaling, rounding up.
        let complement = leg.fee_complement();
        Ok((&hi + &complement - 1) / complement)
    }
}

/// The curve for a pool whose first asset carries `weight`: the constant
/// product for even pools and the weighted invariant otherwise.
pub fn curve_for_weight(weight: u8) -> Arc<dyn SwapCurve> {
    if weight == 50 {
        Arc::new(ConstantProduct)
    } else {
        Arc::new(WeightedProduct)
    }
}
