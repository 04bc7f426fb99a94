//! Router configuration parameters.

use crate::pool::{PoolParams, DEFAULT_FEE_BPS, DEFAULT_WEIGHT};
use crate::search::BestTradeOptions;

/// Configuration for the [`Router`](crate::router::Router).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Fee applied to pools created through the router, in basis points.
    /// For example, 20 = 0.20% fee.
    pub fee_bps: u16,

    /// Weight of the first asset of pools created through the router.
    pub weight: u8,

    /// Maximum number of pools in a route.
    pub max_hops: usize,

    /// Maximum number of trades a search returns.
    pub max_num_results: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS, // 0.20%
            weight: DEFAULT_WEIGHT,   // 50/50
            max_hops: 3,
            max_num_results: 3,
        }
    }
}

impl RouterConfig {
    /// Create a new configuration with custom fee.
    pub fn with_fee_bps(mut self, fee_bps: u16) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Create a new configuration with custom weight.
    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    /// Create a new configuration with custom max hops.
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Create a new configuration with custom result limit.
    pub fn with_max_num_results(mut self, max_num_results: usize) -> Self {
        self.max_num_results = max_num_results;
        self
    }

    /// Parameters for pools created under this configuration.
    pub fn pool_params(&self) -> PoolParams {
        PoolParams::default()
            .with_fee_bps(self.fee_bps)
            .with_weight(self.weight)
    }

    /// Bounds for searches run under this configuration.
    pub fn search_options(&self) -> BestTradeOptions {
        BestTradeOptions {
            max_hops: self.max_hops,
            max_num_results: self.max_num_results,
        }
    }
}
