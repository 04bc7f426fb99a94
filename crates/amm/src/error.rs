//! Error type shared by every arithmetic, pool, route and trade operation.

use crate::pool::PoolId;
use alloy_primitives::Address;

/// Errors raised by the AMM core.
///
/// Every variant is a precondition failure: all operations are pure, so the
/// same inputs always reproduce the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmmError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("chain mismatch: {left} != {right}")]
    ChainMismatch { left: u64, right: u64 },

    #[error("identical assets: {0}")]
    IdenticalAssets(Address),

    #[error("asset mismatch: expected {expected}, got {actual}")]
    AssetMismatch { expected: String, actual: String },

    #[error("insufficient reserves")]
    InsufficientReserves,

    #[error("insufficient input amount")]
    InsufficientInputAmount,

    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("native assets cannot be held in a pool")]
    NativeAssetInPool,

    #[error("asset {0} is not part of the pool")]
    AssetNotInPool(Address),

    #[error("invalid fee: {0} bps (must be below 10000)")]
    InvalidFee(u16),

    #[error("invalid weight: {0} (must be within 1..=99)")]
    InvalidWeight(u8),

    #[error("invalid slippage tolerance: must not be negative")]
    InvalidSlippage,

    #[error("pool {0} is not registered")]
    PoolNotFound(PoolId),

    #[error("invalid search bounds: {0}")]
    InvalidSearch(&'static str),

    #[error("hop {hop} failed: {source}")]
    Hop {
        hop: usize,
        #[source]
        source: Box<AmmError>,
    },
}

impl AmmError {
    /// Attribute an error to a position within a route.
    pub(crate) fn at_hop(self, hop: usize) -> Self {
        AmmError::Hop {
            hop,
            source: Box::new(self),
        }
    }

    /// The underlying error, looking through any hop attribution.
    pub fn root(&self) -> &AmmError {
        match self {
            AmmError::Hop { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = AmmError> = std::result::Result<T, E>;
