//! Two-asset liquidity pools.

use crate::amount::Amount;
use crate::asset::{Asset, Token};
use crate::curve::{curve_for_weight, Leg, SwapCurve, FEE_DENOMINATOR};
use crate::error::{AmmError, Result};
use crate::price::Price;
use alloy_primitives::{keccak256, Address, B256};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::fmt;
use std::sync::Arc;

/// Default swap fee: 0.20%.
pub const DEFAULT_FEE_BPS: u16 = 20;

/// Default weight of the first asset: an even 50/50 pool.
pub const DEFAULT_WEIGHT: u8 = 50;

/// Deterministic pool identity.
///
/// Derived from the sorted token addresses, the weight of the first sorted
/// token and the fee, so the same parameters always give the same id and
/// changing any of them gives a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub B256);

impl PoolId {
    /// Compute the id for a pool over `token_a` and `token_b`, where
    /// `weight_a` is the weight of `token_a` (in either sort position).
    pub fn compute(token_a: &Token, token_b: &Token, weight_a: u8, fee_bps: u16) -> Result<Self> {
        validate_params(weight_a, fee_bps)?;
        let (token0, token1, weight0) = if token_a.sorts_before(token_b)? {
            (token_a.address, token_b.address, weight_a)
        } else {
            (token_b.address, token_a.address, 100 - weight_a)
        };
        Ok(Self::from_sorted(token0, token1, weight0, fee_bps))
    }

    /// `keccak256(token0 ++ token1 ++ uint8 weight0 ++ uint16 fee)`, the
    /// Solidity `abi.encodePacked` layout.
    fn from_sorted(token0: Address, token1: Address, weight0: u8, fee_bps: u16) -> Self {
        let mut packed = [0u8; 43];
        packed[0..20].copy_from_slice(token0.as_slice());
        packed[20..40].copy_from_slice(token1.as_slice());
        packed[40] = weight0;
        packed[41..43].copy_from_slice(&fee_bps.to_be_bytes());
        Self(keccak256(packed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Construction parameters of a pool beyond its reserves.
#[derive(Debug, Clone)]
pub struct PoolParams {
    /// Swap fee in basis points, below 10000.
    pub fee_bps: u16,
    /// Weight of the first asset passed to the constructor, within 1..=99.
    pub weight: u8,
    /// Invariant used for swap math. Chosen from the weight when unset.
    pub curve: Option<Arc<dyn SwapCurve>>,
}

impl Default for PoolParams {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
            weight: DEFAULT_WEIGHT,
            curve: None,
        }
    }
}

impl PoolParams {
    pub fn with_fee_bps(mut self, fee_bps: u16) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_curve(mut self, curve: Arc<dyn SwapCurve>) -> Self {
        self.curve = Some(curve);
        self
    }
}

fn validate_params(weight: u8, fee_bps: u16) -> Result<()> {
    if u32::from(fee_bps) >= FEE_DENOMINATOR {
        return Err(AmmError::InvalidFee(fee_bps));
    }
    if weight == 0 || weight >= 100 {
        return Err(AmmError::InvalidWeight(weight));
    }
    Ok(())
}

/// A pool holding reserves of two distinct tokens on the same chain.
///
/// Pools are values: swapping returns a new pool with the post-trade
/// reserves and leaves the original untouched. Reserves are kept in
/// canonical token order (see [`Token::sorts_before`]).
#[derive(Debug, Clone)]
pub struct Pool {
    token0: Token,
    token1: Token,
    reserve0: Amount,
    reserve1: Amount,
    fee_bps: u16,
    weight0: u8,
    curve: Arc<dyn SwapCurve>,
}

impl Pool {
    /// A 50/50 constant-product pool with the default fee.
    pub fn new(reserve_a: Amount, reserve_b: Amount) -> Result<Self> {
        Self::with_params(reserve_a, reserve_b, PoolParams::default())
    }

    /// A pool with explicit fee, weight and curve. The weight applies to the
    /// asset of `reserve_a`. Without an explicit curve, even pools use the
    /// constant product and uneven ones the weighted invariant.
    pub fn with_params(reserve_a: Amount, reserve_b: Amount, params: PoolParams) -> Result<Self> {
        validate_params(params.weight, params.fee_bps)?;
        let curve = params
            .curve
            .unwrap_or_else(|| curve_for_weight(params.weight));
        let token_a = reserve_a.asset().require_token()?.clone();
        let token_b = reserve_b.asset().require_token()?.clone();

        let pool = if token_a.sorts_before(&token_b)? {
            Self {
                token0: token_a,
                token1: token_b,
                reserve0: reserve_a,
                reserve1: reserve_b,
                fee_bps: params.fee_bps,
                weight0: params.weight,
                curve,
            }
        } else {
            Self {
                token0: token_b,
                token1: token_a,
                reserve0: reserve_b,
                reserve1: reserve_a,
                fee_bps: params.fee_bps,
                weight0: 100 - params.weight,
                curve,
            }
        };
        Ok(pool)
    }

    pub fn id(&self) -> PoolId {
        PoolId::from_sorted(
            self.token0.address,
            self.token1.address,
            self.weight0,
            self.fee_bps,
        )
    }

    pub fn chain_id(&self) -> u64 {
        self.token0.chain_id
    }

    pub fn token0(&self) -> &Token {
        &self.token0
    }

    pub fn token1(&self) -> &Token {
        &self.token1
    }

    pub fn reserve0(&self) -> &Amount {
        &self.reserve0
    }

    pub fn reserve1(&self) -> &Amount {
        &self.reserve1
    }

    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    /// Weight of `token0`; `token1` holds the remainder of 100.
    pub fn weight0(&self) -> u8 {
        self.weight0
    }

    pub fn curve(&self) -> &Arc<dyn SwapCurve> {
        &self.curve
    }

    pub fn involves(&self, token: &Token) -> bool {
        *token == self.token0 || *token == self.token1
    }

    pub fn involves_asset(&self, asset: &Asset) -> bool {
        asset.as_token().is_some_and(|token| self.involves(token))
    }

    /// The token on the other side of `token`.
    pub fn other(&self, token: &Token) -> Result<&Token> {
        if *token == self.token0 {
            Ok(&self.token1)
        } else if *token == self.token1 {
            Ok(&self.token0)
        } else {
            Err(AmmError::AssetNotInPool(token.address))
        }
    }

    pub fn reserve_of(&self, token: &Token) -> Result<&Amount> {
        if *token == self.token0 {
            Ok(&self.reserve0)
        } else if *token == self.token1 {
            Ok(&self.reserve1)
        } else {
            Err(AmmError::AssetNotInPool(token.address))
        }
    }

    pub fn weight_of(&self, token: &Token) -> Result<u8> {
        if *token == self.token0 {
            Ok(self.weight0)
        } else if *token == self.token1 {
            Ok(100 - self.weight0)
        } else {
            Err(AmmError::AssetNotInPool(token.address))
        }
    }

    /// Spot price of `token` in terms of the other token, from the reserves
    /// alone (no fee, no weighting).
    pub fn price_of(&self, token: &Token) -> Result<Price> {
        let other = self.other(token)?;
        Price::from_amounts(self.reserve_of(token)?, self.reserve_of(other)?)
    }

    pub fn token0_price(&self) -> Result<Price> {
        self.price_of(&self.token0)
    }

    pub fn token1_price(&self) -> Result<Price> {
        self.price_of(&self.token1)
    }

    /// Replace both reserves after a re-sync from chain data. `reserve0` and
    /// `reserve1` follow the canonical token order.
    pub fn with_reserves(&self, reserve0: impl Into<BigInt>, reserve1: impl Into<BigInt>) -> Result<Self> {
        Ok(Self {
            reserve0: Amount::from_raw(self.token0.clone(), reserve0)?,
            reserve1: Amount::from_raw(self.token1.clone(), reserve1)?,
            ..self.clone()
        })
    }

    /// Amount received for selling `input`, and the pool after the swap.
    pub fn get_output_amount(&self, input: &Amount) -> Result<(Amount, Pool)> {
        let token_in = self.pool_token(input.asset())?;
        let token_out = self.other(token_in)?;
        let reserve_in = self.reserve_of(token_in)?;
        let reserve_out = self.reserve_of(token_out)?;
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientReserves);
        }
        if !input.raw().is_positive() {
            return Err(AmmError::InsufficientInputAmount);
        }

        let out = self
            .curve
            .output_amount(&self.leg(token_in, token_out)?, input.raw())?;
        if out.is_zero() {
            return Err(AmmError::InsufficientInputAmount);
        }
        let output = Amount::from_raw(token_out.clone(), out)?;
        let next = self.after_swap(token_in, input, &output)?;
        Ok((output, next))
    }

    /// Amount that must be sold to receive `output`, and the pool after the swap.
    pub fn get_input_amount(&self, output: &Amount) -> Result<(Amount, Pool)> {
        let token_out = self.pool_token(output.asset())?;
        let token_in = self.other(token_out)?;
        let reserve_in = self.reserve_of(token_in)?;
        let reserve_out = self.reserve_of(token_out)?;
        if reserve_in.is_zero() || reserve_out.is_zero() || output.raw() >= reserve_out.raw() {
            return Err(AmmError::InsufficientReserves);
        }
        if !output.raw().is_positive() {
            return Err(AmmError::InsufficientOutputAmount);
        }

        let raw_in = self
            .curve
            .input_amount(&self.leg(token_in, token_out)?, output.raw())?;
        let input = Amount::from_raw(token_in.clone(), raw_in)?;
        let next = self.after_swap(token_in, &input, output)?;
        Ok((input, next))
    }

    fn pool_token<'a>(&self, asset: &'a Asset) -> Result<&'a Token> {
        let token = asset.require_token()?;
        if !self.involves(token) {
            return Err(AmmError::AssetNotInPool(token.address));
        }
        Ok(token)
    }

    fn leg(&self, token_in: &Token, token_out: &Token) -> Result<Leg<'_>> {
        Ok(Leg {
            reserve_in: self.reserve_of(token_in)?.raw(),
            reserve_out: self.reserve_of(token_out)?.raw(),
            fee_bps: self.fee_bps,
            weight_in: self.weight_of(token_in)?,
            weight_out: self.weight_of(token_out)?,
        })
    }

    fn after_swap(&self, token_in: &Token, input: &Amount, output: &Amount) -> Result<Pool> {
        let (reserve0, reserve1) = if *token_in == self.token0 {
            (
                self.reserve0.add(input)?,
                self.reserve1.subtract(output)?,
            )
        } else {
            (
                self.reserve0.subtract(output)?,
                self.reserve1.add(input)?,
            )
        };
        Ok(Self {
            reserve0,
            reserve1,
            ..self.clone()
        })
    }
}

impl PartialEq for Pool {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.reserve0 == other.reserve0 && self.reserve1 == other.reserve1
    }
}

impl Eq for Pool {}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({} bps, {}/{})",
            self.token0,
            self.token1,
            self.fee_bps,
            self.weight0,
            100 - self.weight0
        )
    }
}
