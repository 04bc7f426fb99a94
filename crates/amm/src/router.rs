//! Pool registry and entry point for best-trade searches.

use crate::amount::Amount;
use crate::asset::Token;
use crate::config::RouterConfig;
use crate::error::{AmmError, Result};
use crate::pool::{Pool, PoolId};
use crate::search::{self, BestTradeOptions};
use crate::trade::Trade;
use num_bigint::BigInt;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Holds the set of known pools and routes trades through them.
///
/// Pools keep their insertion order, which is the order the search visits
/// them in. Registering a pool whose id is already known replaces it in place.
#[derive(Debug, Default)]
pub struct Router {
    /// Configuration for pool creation and searches.
    config: RouterConfig,
    /// All pools in insertion order.
    pools: Vec<Pool>,
    /// Position of each pool in `pools`.
    index: HashMap<PoolId, usize>,
}

impl Router {
    /// Create a new router with default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a new router with custom configuration.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            pools: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Update the configuration. Pools already registered keep their fee
    /// and weight.
    pub fn set_config(&mut self, config: RouterConfig) {
        self.config = config;
    }

    /// Build a pool with the configured fee and weight and register it.
    pub fn create_pool(&mut self, reserve_a: Amount, reserve_b: Amount) -> Result<PoolId> {
        let pool = Pool::with_params(reserve_a, reserve_b, self.config.pool_params())?;
        let id = pool.id();
        self.add_pool(pool);
        Ok(id)
    }

    /// Register `pool`, returning the pool it replaced if its id was known.
    pub fn add_pool(&mut self, pool: Pool) -> Option<Pool> {
        let id = pool.id();
        match self.index.get(&id) {
            Some(&position) => {
                debug!(%id, "replacing pool");
                Some(std::mem::replace(&mut self.pools[position], pool))
            }
            None => {
                debug!(%id, pool = %pool, "adding pool");
                self.index.insert(id, self.pools.len());
                self.pools.push(pool);
                None
            }
        }
    }

    /// Unregister a pool. Later pools keep their relative order.
    pub fn remove_pool(&mut self, id: &PoolId) -> Result<Pool> {
        let position = self.index.remove(id).ok_or(AmmError::PoolNotFound(*id))?;
        let pool = self.pools.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        debug!(%id, "removed pool");
        Ok(pool)
    }

    /// Replace a pool's reserves, in canonical token order.
    pub fn sync_reserves(
        &mut self,
        id: &PoolId,
        reserve0: impl Into<BigInt>,
        reserve1: impl Into<BigInt>,
    ) -> Result<()> {
        let position = *self.index.get(id).ok_or(AmmError::PoolNotFound(*id))?;
        let synced = self.pools[position].with_reserves(reserve0, reserve1)?;
        self.pools[position] = synced;
        Ok(())
    }

    pub fn pool(&self, id: &PoolId) -> Option<&Pool> {
        self.index.get(id).map(|&position| &self.pools[position])
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Every pool holding `token`.
    pub fn pools_for_token<'a>(&'a self, token: &'a Token) -> impl Iterator<Item = &'a Pool> + 'a {
        self.pools.iter().filter(move |pool| pool.involves(token))
    }

    /// Get all tokens that can be reached from a given token, ignoring
    /// reserves and hop limits.
    pub fn reachable_tokens(&self, from: &Token) -> HashSet<Token> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(from.clone());

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for pool in self.pools_for_token(&current) {
                if let Ok(neighbor) = pool.other(&current) {
                    if !visited.contains(neighbor) {
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }

        visited.remove(from);
        visited
    }

    /// Check if there's any path between two tokens.
    pub fn has_path(&self, from: &Token, to: &Token) -> bool {
        if from == to {
            return true;
        }
        self.reachable_tokens(from).contains(to)
    }

    /// Best trades selling exactly `amount_in` for `token_out`, within the
    /// configured bounds.
    pub fn best_trade_exact_in(&self, amount_in: &Amount, token_out: &Token) -> Result<Vec<Trade>> {
        self.best_trade_exact_in_with(amount_in, token_out, self.config.search_options())
    }

    pub fn best_trade_exact_in_with(
        &self,
        amount_in: &Amount,
        token_out: &Token,
        options: BestTradeOptions,
    ) -> Result<Vec<Trade>> {
        search::best_trade_exact_in(&self.pools, amount_in, token_out, options)
    }

    /// Best trades buying exactly `amount_out` with `token_in`, within the
    /// configured bounds.
    pub fn best_trade_exact_out(&self, token_in: &Token, amount_out: &Amount) -> Result<Vec<Trade>> {
        self.best_trade_exact_out_with(token_in, amount_out, self.config.search_options())
    }

    pub fn best_trade_exact_out_with(
        &self,
        token_in: &Token,
        amount_out: &Amount,
        options: BestTradeOptions,
    ) -> Result<Vec<Trade>> {
        search::best_trade_exact_out(&self.pools, token_in, amount_out, options)
    }
}
