//! Data sources and assembly of core pools from them.

use crate::address::PoolAddressDeriver;
use crate::decimals::DecimalsResolver;
use crate::error::DataError;
use alloy_primitives::Address;
use amm::{Amount, Pool, PoolParams, SwapCurve, Token};
use num_bigint::BigInt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Provides pool reserves.
pub trait ReserveSource {
    /// Reserves of the pool at `pool`, in canonical token order.
    fn reserves(&self, pool: Address) -> Result<(BigInt, BigInt), DataError>;
}

/// Provides token decimals.
pub trait DecimalsSource {
    fn decimals(&self, chain_id: u64, token: Address) -> Result<u8, DataError>;
}

/// Builds [`Pool`]s from token addresses and caller-known pool parameters.
#[derive(Debug)]
pub struct PoolLoader<R, D> {
    chain_id: u64,
    deriver: PoolAddressDeriver,
    decimals: DecimalsResolver<D>,
    reserves: R,
    /// Symbol and name metadata for known tokens.
    known: HashMap<Address, Token>,
    curve: Option<Arc<dyn SwapCurve>>,
}

impl<R: ReserveSource, D: DecimalsSource> PoolLoader<R, D> {
    pub fn new(
        chain_id: u64,
        deriver: PoolAddressDeriver,
        decimals: DecimalsResolver<D>,
        reserves: R,
    ) -> Self {
        Self {
            chain_id,
            deriver,
            decimals,
            reserves,
            known: HashMap::new(),
            curve: None,
        }
    }

    /// Curve for every loaded pool, overriding the one picked from its weight.
    pub fn with_curve(mut self, curve: Arc<dyn SwapCurve>) -> Self {
        self.curve = Some(curve);
        self
    }

    /// Attach symbol and name metadata to tokens this loader builds.
    pub fn register(&mut self, token: Token) {
        self.known.insert(token.address, token);
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn deriver(&self) -> &PoolAddressDeriver {
        &self.deriver
    }

    /// The token at `address`, with resolved decimals.
    pub fn token(&self, address: Address) -> Result<Token, DataError> {
        let decimals = self.decimals.resolve(self.chain_id, address)?;
        let mut token = Token::new(self.chain_id, address, decimals);
        if let Some(known) = self.known.get(&address) {
            token.symbol = known.symbol.clone();
            token.name = known.name.clone();
        }
        Ok(token)
    }

    /// Load the pool over `token_a` and `token_b`. `weight_a` is the weight
    /// of `token_a`; together with `fee_bps` it selects which pool is read.
    pub fn load(
        &self,
        token_a: Address,
        token_b: Address,
        weight_a: u8,
        fee_bps: u16,
    ) -> Result<Pool, DataError> {
        let token_a = self.token(token_a)?;
        let token_b = self.token(token_b)?;
        let pool = self
            .deriver
            .pool_address(&token_a, &token_b, weight_a, fee_bps)?;
        debug!(%pool, %token_a, %token_b, weight_a, fee_bps, "fetching reserves");

        let (reserve0, reserve1) =
            self.reserves
                .reserves(pool)
                .map_err(|err| DataError::Reserves {
                    pool,
                    weight: weight_a,
                    fee_bps,
                    reason: err.to_string(),
                })?;

        let (reserve_a, reserve_b) = if token_a.sorts_before(&token_b)? {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };
        let mut params = PoolParams::default()
            .with_weight(weight_a)
            .with_fee_bps(fee_bps);
        if let Some(curve) = &self.curve {
            params = params.with_curve(curve.clone());
        }
        let loaded = Pool::with_params(
            Amount::from_raw(token_a, reserve_a)?,
            Amount::from_raw(token_b, reserve_b)?,
            params,
        )?;
        info!(%pool, pool_id = %loaded.id(), "loaded pool {loaded}");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimals::DecimalsCache;
    use alloy_primitives::B256;

    struct FixedReserves(HashMap<Address, (u64, u64)>);

    impl ReserveSource for FixedReserves {
        fn reserves(&self, pool: Address) -> Result<(BigInt, BigInt), DataError> {
            self.0
                .get(&pool)
                .map(|&(r0, r1)| (BigInt::from(r0), BigInt::from(r1)))
                .ok_or_else(|| DataError::Call {
                    to: pool,
                    reason: "execution reverted".to_string(),
                })
        }
    }

    struct EighteenDecimals;

    impl DecimalsSource for EighteenDecimals {
        fn decimals(&self, _chain_id: u64, _token: Address) -> Result<u8, DataError> {
            Ok(18)
        }
    }

    fn deriver() -> PoolAddressDeriver {
        PoolAddressDeriver::new(Address::repeat_byte(0xfa), B256::repeat_byte(0x11))
    }

    fn loader(reserves: FixedReserves) -> PoolLoader<FixedReserves, EighteenDecimals> {
        let decimals = DecimalsResolver::new(EighteenDecimals, Arc::new(DecimalsCache::new()))
            .with_override(1, usdc(), 6);
        PoolLoader::new(1, deriver(), decimals, reserves)
    }

    fn usdc() -> Address {
        Address::repeat_byte(0x01)
    }

    fn weth() -> Address {
        Address::repeat_byte(0x02)
    }

    #[test]
    fn test_reserves_map_onto_sorted_tokens() {
        let usdc_token = Token::new(1, usdc(), 6);
        let weth_token = Token::new(1, weth(), 18);
        let address = deriver()
            .pool_address(&weth_token, &usdc_token, 50, 20)
            .unwrap();
        let mut loader = loader(FixedReserves(HashMap::from([(address, (2_000_000, 1_000))])));
        loader.register(usdc_token.clone().with_symbol("USDC"));

        // arguments in reverse order: reserves still follow USDC, WETH
        let pool = loader.load(weth(), usdc(), 50, 20).unwrap();
        assert_eq!(pool.token0().symbol.as_deref(), Some("USDC"));
        assert_eq!(pool.token0().decimals, 6);
        assert_eq!(pool.reserve_of(&usdc_token).unwrap().raw(), &BigInt::from(2_000_000));
        assert_eq!(pool.reserve_of(&weth_token).unwrap().raw(), &BigInt::from(1_000));
        assert_eq!(pool.fee_bps(), 20);
    }

    #[test]
    fn test_weight_follows_first_argument() {
        let usdc_token = Token::new(1, usdc(), 6);
        let weth_token = Token::new(1, weth(), 18);
        let address = deriver()
            .pool_address(&weth_token, &usdc_token, 80, 30)
            .unwrap();
        let loader = loader(FixedReserves(HashMap::from([(address, (1, 1))])));

        let pool = loader.load(weth(), usdc(), 80, 30).unwrap();
        assert_eq!(pool.weight_of(&weth_token).unwrap(), 80);
        assert_eq!(pool.weight0(), 20);
    }

    #[test]
    fn test_uneven_pool_prices_by_weight() {
        let usdc_token = Token::new(1, usdc(), 6);
        let weth_token = Token::new(1, weth(), 18);
        let even = deriver().pool_address(&weth_token, &usdc_token, 50, 20).unwrap();
        let heavy = deriver().pool_address(&weth_token, &usdc_token, 80, 20).unwrap();
        let loader = loader(FixedReserves(HashMap::from([
            (even, (1_000_000, 1_000_000)),
            (heavy, (1_000_000, 1_000_000)),
        ])));

        let sell = Amount::from_raw(weth_token, 10_000u64).unwrap();
        let (even_out, _) = loader
            .load(weth(), usdc(), 50, 20)
            .unwrap()
            .get_output_amount(&sell)
            .unwrap();
        let (heavy_out, _) = loader
            .load(weth(), usdc(), 80, 20)
            .unwrap()
            .get_output_amount(&sell)
            .unwrap();
        assert_eq!(even_out.raw(), &BigInt::from(9881));
        assert_eq!(heavy_out.raw(), &BigInt::from(38943));
    }

    #[test]
    fn test_missing_pool_reports_parameters() {
        let loader = loader(FixedReserves(HashMap::new()));
        let err = loader.load(usdc(), weth(), 60, 5).unwrap_err();
        match &err {
            DataError::Reserves {
                weight, fee_bps, ..
            } => {
                assert_eq!((*weight, *fee_bps), (60, 5));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("execution reverted"));
    }
}
