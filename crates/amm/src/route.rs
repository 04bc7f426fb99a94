//! Validated chains of pools.

use crate::asset::Token;
use crate::error::{AmmError, Result};
use crate::pool::Pool;
use crate::price::Price;
use std::fmt;

/// An ordered sequence of pools leading from `input` to `output`.
///
/// Consecutive pools share the asset carried between them. The number of
/// hops is not limited here; the search bounds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pools: Vec<Pool>,
    path: Vec<Token>,
}

impl Route {
    /// Walk `pools` starting from `input`, checking that every pool holds the
    /// asset carried from the previous one.
    pub fn new(pools: Vec<Pool>, input: &Token) -> Result<Self> {
        let Some(first) = pools.first() else {
            return Err(AmmError::InvalidRoute("route has no pools".to_string()));
        };
        let chain_id = first.chain_id();
        if input.chain_id != chain_id {
            return Err(AmmError::InvalidRoute(format!(
                "input {input} is on chain {}, pools are on chain {chain_id}",
                input.chain_id
            )));
        }

        let mut path = Vec::with_capacity(pools.len() + 1);
        path.push(input.clone());
        for (hop, pool) in pools.iter().enumerate() {
            if pool.chain_id() != chain_id {
                return Err(AmmError::InvalidRoute(format!(
                    "pool {hop} is on chain {}, expected {chain_id}",
                    pool.chain_id()
                )));
            }
            let carried = &path[hop];
            let next = pool.other(carried).map_err(|_| {
                AmmError::InvalidRoute(format!("pool {hop} ({pool}) does not hold {carried}"))
            })?;
            path.push(next.clone());
        }

        Ok(Self { pools, path })
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// Every token visited, input first and output last.
    pub fn path(&self) -> &[Token] {
        &self.path
    }

    pub fn input(&self) -> &Token {
        &self.path[0]
    }

    pub fn output(&self) -> &Token {
        &self.path[self.path.len() - 1]
    }

    pub fn chain_id(&self) -> u64 {
        self.input().chain_id
    }

    /// Number of pools, i.e. hops.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Product of each pool's spot price along the path: output per input,
    /// ignoring fees and size.
    pub fn mid_price(&self) -> Result<Price> {
        let mut price = self.pools[0].price_of(&self.path[0])?;
        for (pool, token) in self.pools.iter().zip(&self.path).skip(1) {
            price = price.multiply(&pool.price_of(token)?)?;
        }
        Ok(price)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::fraction::ExactFraction;
    use alloy_primitives::Address;

    fn token(byte: u8, symbol: &str) -> Token {
        Token::new(1, Address::repeat_byte(byte), 18).with_symbol(symbol)
    }

    fn pool(a: &Token, ra: u64, b: &Token, rb: u64) -> Pool {
        Pool::new(
            Amount::from_raw(a.clone(), ra).unwrap(),
            Amount::from_raw(b.clone(), rb).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_path_follows_shared_assets() {
        let (a, b, c) = (token(1, "A"), token(2, "B"), token(3, "C"));
        // second pool is given as (C, B): the route must still walk B -> C
        let route = Route::new(vec![pool(&a, 100, &b, 200), pool(&c, 50, &b, 100)], &a).unwrap();
        assert_eq!(route.path(), &[a.clone(), b, c.clone()]);
        assert_eq!(route.input(), &a);
        assert_eq!(route.output(), &c);
        assert_eq!(route.len(), 2);
        assert_eq!(route.to_string(), "A -> B -> C");
    }

    #[test]
    fn test_disconnected_pools_rejected() {
        let (a, b, c, d) = (token(1, "A"), token(2, "B"), token(3, "C"), token(4, "D"));
        let err = Route::new(vec![pool(&a, 1, &b, 1), pool(&c, 1, &d, 1)], &a).unwrap_err();
        assert!(matches!(err, AmmError::InvalidRoute(_)));

        // input not in the first pool
        let err = Route::new(vec![pool(&b, 1, &c, 1)], &a).unwrap_err();
        assert!(matches!(err, AmmError::InvalidRoute(_)));
    }

    #[test]
    fn test_empty_and_cross_chain_rejected() {
        let a = token(1, "A");
        assert!(matches!(Route::new(vec![], &a), Err(AmmError::InvalidRoute(_))));

        let b = token(2, "B");
        let far_a = Token::new(10, Address::repeat_byte(1), 18);
        let far_b = Token::new(10, Address::repeat_byte(2), 18);
        let pools = vec![pool(&a, 1, &b, 1), pool(&far_b, 1, &far_a, 1)];
        assert!(matches!(Route::new(pools, &a), Err(AmmError::InvalidRoute(_))));
    }

    #[test]
    fn test_mid_price_chains_pools() {
        let (a, b, c) = (token(1, "A"), token(2, "B"), token(3, "C"));
        let route = Route::new(vec![pool(&a, 100, &b, 200), pool(&b, 100, &c, 300)], &a).unwrap();
        let mid = route.mid_price().unwrap();
        // 2 B per A, 3 C per B
        assert_eq!(mid.adjusted(), ExactFraction::from_integer(6));
        assert_eq!(mid.base_asset().as_token(), Some(&a));
        assert_eq!(mid.quote_asset().as_token(), Some(&c));
    }
}
