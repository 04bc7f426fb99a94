//! Trades along a single route.

use crate::amount::Amount;
use crate::asset::Asset;
use crate::error::{AmmError, Result};
use crate::fraction::{ExactFraction, Percent};
use crate::price::Price;
use crate::route::Route;
use std::fmt;

/// Which side of the trade is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    /// The input is fixed; the output is computed.
    ExactInput,
    /// The output is fixed; the input is computed.
    ExactOutput,
}

/// A swap through every pool of a route, with both sides resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    route: Route,
    trade_type: TradeType,
    input_amount: Amount,
    output_amount: Amount,
    execution_price: Price,
    price_impact: Percent,
}

impl Trade {
    /// Sell exactly `amount_in` along `route`.
    ///
    /// A failing pool is reported as [`AmmError::Hop`] with its position.
    pub fn exact_in(route: Route, amount_in: Amount) -> Result<Self> {
        ensure_asset(&amount_in, &Asset::Token(route.input().clone()))?;

        let mut carried = amount_in.clone();
        for (hop, pool) in route.pools().iter().enumerate() {
            let (output, _) = pool
                .get_output_amount(&carried)
                .map_err(|err| err.at_hop(hop))?;
            carried = output;
        }
        Self::build(route, TradeType::ExactInput, amount_in, carried)
    }

    /// Buy exactly `amount_out` along `route`, walking the pools backwards.
    pub fn exact_out(route: Route, amount_out: Amount) -> Result<Self> {
        ensure_asset(&amount_out, &Asset::Token(route.output().clone()))?;

        let mut carried = amount_out.clone();
        for (hop, pool) in route.pools().iter().enumerate().rev() {
            let (input, _) = pool
                .get_input_amount(&carried)
                .map_err(|err| err.at_hop(hop))?;
            carried = input;
        }
        Self::build(route, TradeType::ExactOutput, carried, amount_out)
    }

    fn build(
        route: Route,
        trade_type: TradeType,
        input_amount: Amount,
        output_amount: Amount,
    ) -> Result<Self> {
        let execution_price = Price::from_amounts(&input_amount, &output_amount)?;
        let mid_price = route.mid_price()?;
        // (mid - execution) / mid over raw ratios
        let price_impact = (mid_price.raw() - execution_price.raw()).checked_div(mid_price.raw())?;
        Ok(Self {
            route,
            trade_type,
            input_amount,
            output_amount,
            execution_price,
            price_impact: price_impact.into(),
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    pub fn input_amount(&self) -> &Amount {
        &self.input_amount
    }

    pub fn output_amount(&self) -> &Amount {
        &self.output_amount
    }

    /// Output per input actually realised.
    pub fn execution_price(&self) -> &Price {
        &self.execution_price
    }

    /// How far the execution price falls short of the route's mid price.
    pub fn price_impact(&self) -> &Percent {
        &self.price_impact
    }

    pub fn hops(&self) -> usize {
        self.route.len()
    }

    /// Least output acceptable under `slippage`. Exact-output trades return
    /// their fixed output.
    pub fn minimum_amount_out(&self, slippage: &Percent) -> Result<Amount> {
        let slippage = check_slippage(slippage)?;
        match self.trade_type {
            TradeType::ExactOutput => Ok(self.output_amount.clone()),
            TradeType::ExactInput => {
                let factor = (&ExactFraction::one() + slippage).invert()?;
                self.output_amount.multiply(&factor)
            }
        }
    }

    /// Most input acceptable under `slippage`. Exact-input trades return
    /// their fixed input.
    pub fn maximum_amount_in(&self, slippage: &Percent) -> Result<Amount> {
        let slippage = check_slippage(slippage)?;
        match self.trade_type {
            TradeType::ExactInput => Ok(self.input_amount.clone()),
            TradeType::ExactOutput => {
                let factor = &ExactFraction::one() + slippage;
                self.input_amount.multiply(&factor)
            }
        }
    }

    /// Execution price if slippage consumes the whole tolerance.
    pub fn worst_execution_price(&self, slippage: &Percent) -> Result<Price> {
        Price::from_amounts(
            &self.maximum_amount_in(slippage)?,
            &self.minimum_amount_out(slippage)?,
        )
    }
}

fn ensure_asset(amount: &Amount, expected: &Asset) -> Result<()> {
    if amount.asset() != expected {
        return Err(AmmError::AssetMismatch {
            expected: expected.to_string(),
            actual: amount.asset().to_string(),
        });
    }
    Ok(())
}

fn check_slippage(slippage: &Percent) -> Result<&ExactFraction> {
    let fraction = slippage.as_fraction();
    if fraction.is_negative() {
        return Err(AmmError::InvalidSlippage);
    }
    Ok(fraction)
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} via {} (impact {})",
            self.input_amount, self.output_amount, self.route, self.price_impact
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Token;
    use crate::pool::{Pool, PoolParams};
    use alloy_primitives::Address;
    use num_bigint::BigInt;

    fn token(byte: u8, symbol: &str) -> Token {
        Token::new(1, Address::repeat_byte(byte), 18).with_symbol(symbol)
    }

    fn amount(token: &Token, raw: u64) -> Amount {
        Amount::from_raw(token.clone(), raw).unwrap()
    }

    fn fee_free(a: &Token, ra: u64, b: &Token, rb: u64) -> Pool {
        Pool::with_params(amount(a, ra), amount(b, rb), PoolParams::default().with_fee_bps(0)).unwrap()
    }

    fn two_hop() -> (Route, Token, Token) {
        let (a, b, c) = (token(1, "A"), token(2, "B"), token(3, "C"));
        let route = Route::new(
            vec![fee_free(&a, 1000, &b, 1000), fee_free(&b, 1000, &c, 1000)],
            &a,
        )
        .unwrap();
        (route, a, c)
    }

    #[test]
    fn test_exact_in_folds_through_pools() {
        let (route, a, c) = two_hop();
        let trade = Trade::exact_in(route, amount(&a, 100)).unwrap();
        // 100 -> 90 -> 90 * 1000 / 1090 = 82
        assert_eq!(trade.output_amount(), &amount(&c, 82));
        assert_eq!(trade.trade_type(), TradeType::ExactInput);
        assert_eq!(trade.hops(), 2);
        assert_eq!(
            trade.execution_price().raw(),
            &ExactFraction::new(82, 100).unwrap()
        );
        // mid price is 1, so impact is 18%
        assert_eq!(trade.price_impact().as_fraction(), &ExactFraction::new(18, 100).unwrap());
    }

    #[test]
    fn test_exact_out_folds_backwards() {
        let (route, a, c) = two_hop();
        let trade = Trade::exact_out(route, amount(&c, 82)).unwrap();
        // B needed: 1000*82/918 + 1 = 90; A needed: 1000*90/910 + 1 = 99
        assert_eq!(trade.input_amount(), &amount(&a, 99));
        assert_eq!(trade.trade_type(), TradeType::ExactOutput);
    }

    #[test]
    fn test_wrong_input_asset() {
        let (route, _, c) = two_hop();
        assert!(matches!(
            Trade::exact_in(route.clone(), amount(&c, 1)),
            Err(AmmError::AssetMismatch { .. })
        ));
        assert!(matches!(
            Trade::exact_out(route, amount(&token(1, "A"), 1)),
            Err(AmmError::AssetMismatch { .. })
        ));
    }

    #[test]
    fn test_failure_attributed_to_hop() {
        let (a, b, c) = (token(1, "A"), token(2, "B"), token(3, "C"));
        let drained = fee_free(&b, 1000, &c, 1000).with_reserves(1000, 0).unwrap();
        let route = Route::new(vec![fee_free(&a, 1000, &b, 1000), drained], &a).unwrap();
        let err = Trade::exact_in(route, amount(&a, 100)).unwrap_err();
        assert_eq!(
            err,
            AmmError::Hop {
                hop: 1,
                source: Box::new(AmmError::InsufficientReserves)
            }
        );
        assert_eq!(err.root(), &AmmError::InsufficientReserves);
    }

    #[test]
    fn test_exact_out_too_large() {
        let (route, _, c) = two_hop();
        let err = Trade::exact_out(route, amount(&c, 1000)).unwrap_err();
        assert_eq!(err.root(), &AmmError::InsufficientReserves);
        assert!(matches!(err, AmmError::Hop { hop: 1, .. }));
    }

    #[test]
    fn test_slippage_bounds() {
        let (route, a, c) = two_hop();
        let slippage = Percent::from_bps(1000); // 10%

        let exact_in = Trade::exact_in(route.clone(), amount(&a, 100)).unwrap();
        // 82 / 1.1 = 74.5 -> 74
        assert_eq!(exact_in.minimum_amount_out(&slippage).unwrap().raw(), &BigInt::from(74));
        assert_eq!(exact_in.maximum_amount_in(&slippage).unwrap(), amount(&a, 100));
        let worst = exact_in.worst_execution_price(&slippage).unwrap();
        assert_eq!(worst.raw(), &ExactFraction::new(74, 100).unwrap());

        let exact_out = Trade::exact_out(route, amount(&c, 82)).unwrap();
        // 99 * 1.1 = 108.9 -> 108
        assert_eq!(exact_out.maximum_amount_in(&slippage).unwrap().raw(), &BigInt::from(108));
        assert_eq!(exact_out.minimum_amount_out(&slippage).unwrap(), amount(&c, 82));

        let negative = Percent::new(-1, 100).unwrap();
        assert_eq!(exact_out.minimum_amount_out(&negative), Err(AmmError::InvalidSlippage));
    }
}
