//! Errors raised while resolving on-chain data.

use alloy_primitives::Address;
use amm::AmmError;

/// Errors that can occur while loading tokens and pools.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error(
        "failed to fetch reserves of pool {pool} (weight {weight}, fee {fee_bps} bps), \
         check that a pool exists with these parameters: {reason}"
    )]
    Reserves {
        pool: Address,
        weight: u8,
        fee_bps: u16,
        reason: String,
    },

    #[error("failed to resolve decimals of {token} on chain {chain_id}: {reason}")]
    Decimals {
        chain_id: u64,
        token: Address,
        reason: String,
    },

    #[error("call to {to} failed: {reason}")]
    Call { to: Address, reason: String },

    #[error("failed to decode {what} returned by {to}: 0x{data}")]
    Decode {
        what: &'static str,
        to: Address,
        data: String,
    },

    #[error("invalid snapshot: {0}")]
    Snapshot(String),

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("failed to parse snapshot: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_error_names_parameters() {
        let err = DataError::Reserves {
            pool: Address::repeat_byte(0x42),
            weight: 80,
            fee_bps: 30,
            reason: "execution reverted".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains(&Address::repeat_byte(0x42).to_string()));
        assert!(message.contains("weight 80"));
        assert!(message.contains("fee 30 bps"));
        assert!(message.contains("execution reverted"));
    }
}
