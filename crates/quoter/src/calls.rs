//! Pool and token contract bindings, read through a minimal `eth_call` seam.

use crate::error::DataError;
use crate::reserves::{DecimalsSource, ReserveSource};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_macro::sol;
use alloy_sol_types::{SolCall, SolValue};
use num_bigint::{BigInt, Sign};

sol! {
    interface IWeightedPool {
        function getReserves() external view returns (uint256 reserve0, uint256 reserve1, uint32 blockTimestampLast);
    }

    interface IERC20Metadata {
        function decimals() external view returns (uint8);
    }
}

pub mod selectors {
    use super::{IERC20Metadata, IWeightedPool};
    use alloy_sol_types::SolCall;

    pub const GET_RESERVES: [u8; 4] = IWeightedPool::getReservesCall::SELECTOR;
    pub const DECIMALS: [u8; 4] = IERC20Metadata::decimalsCall::SELECTOR;
}

/// Executes a read-only call against a contract.
pub trait EthCall {
    /// Call `to` with `data` and return the raw return data.
    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DataError>;
}

/// Reads reserves and decimals directly from contracts.
#[derive(Debug, Clone)]
pub struct ContractSource<C> {
    client: C,
}

impl<C: EthCall> ContractSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: EthCall> ReserveSource for ContractSource<C> {
    fn reserves(&self, pool: Address) -> Result<(BigInt, BigInt), DataError> {
        let calldata = IWeightedPool::getReservesCall {}.abi_encode();
        let data = self.client.call(pool, calldata.into())?;
        let (reserve0, reserve1, _): (U256, U256, u32) =
            <(U256, U256, u32)>::abi_decode(&data).map_err(|_| DataError::Decode {
                what: "getReserves",
                to: pool,
                data: hex::encode(&data),
            })?;
        Ok((to_bigint(reserve0), to_bigint(reserve1)))
    }
}

impl<C: EthCall> DecimalsSource for ContractSource<C> {
    fn decimals(&self, _chain_id: u64, token: Address) -> Result<u8, DataError> {
        let calldata = IERC20Metadata::decimalsCall {}.abi_encode();
        let data = self.client.call(token, calldata.into())?;
        IERC20Metadata::decimalsCall::abi_decode_returns(&data).map_err(|_| DataError::Decode {
            what: "decimals",
            to: token,
            data: hex::encode(&data),
        })
    }
}

fn to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}
