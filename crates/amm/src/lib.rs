//! Exact-arithmetic AMM library for pricing swaps and routing trades.
//!
//! This library provides:
//! - Rational arithmetic with no floating point anywhere on the pricing path
//! - Tokens, amounts and prices that carry their asset and decimals
//! - Two-asset pools with pluggable swap curves (constant and weighted product)
//! - Multi-hop routes and trades with price impact and slippage bounds
//! - Bounded best-trade search for exact-input and exact-output swaps

pub mod amount;
pub mod asset;
pub mod config;
pub mod curve;
pub mod error;
pub mod fraction;
pub mod pool;
pub mod price;
pub mod route;
pub mod router;
pub mod search;
pub mod trade;

pub use amount::Amount;
pub use asset::{parse_address, Asset, NativeCurrency, Token};
pub use config::RouterConfig;
pub use curve::{
    curve_for_weight, ConstantProduct, Leg, SwapCurve, WeightedProduct, FEE_DENOMINATOR,
};
pub use error::{AmmError, Result};
pub use fraction::{ExactFraction, Percent, Rounding};
pub use pool::{Pool, PoolId, PoolParams, DEFAULT_FEE_BPS, DEFAULT_WEIGHT};
pub use price::Price;
pub use route::Route;
pub use router::Router;
pub use search::{best_trade_exact_in, best_trade_exact_out, compare_trades, BestTradeOptions};
pub use trade::{Trade, TradeType};
