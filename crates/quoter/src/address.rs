//! Deterministic pool address derivation.

use crate::error::DataError;
use alloy_primitives::{keccak256, Address, B256};
use amm::{PoolId, Token};

/// Derives pool addresses the way the pool factory deploys them: CREATE2 with
/// the [`PoolId`] as salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolAddressDeriver {
    pub factory: Address,
    pub init_code_hash: B256,
}

impl PoolAddressDeriver {
    pub fn new(factory: Address, init_code_hash: B256) -> Self {
        Self {
            factory,
            init_code_hash,
        }
    }

    /// Address of the pool over `token_a` and `token_b`, where `weight_a` is
    /// the weight of `token_a`.
    pub fn pool_address(
        &self,
        token_a: &Token,
        token_b: &Token,
        weight_a: u8,
        fee_bps: u16,
    ) -> Result<Address, DataError> {
        let salt = PoolId::compute(token_a, token_b, weight_a, fee_bps)?;
        Ok(create2(self.factory, &salt.0, &self.init_code_hash))
    }
}

fn create2(deployer: Address, salt: &B256, init_code_hash: &B256) -> Address {
    let mut preimage = [0xff; 85];
    preimage[1..21].copy_from_slice(deployer.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..85].copy_from_slice(init_code_hash.as_slice());
    Address::from_slice(&keccak256(preimage)[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    #[test]
    fn test_create2_zero_inputs() {
        // first example of EIP-1014
        let derived = create2(Address::ZERO, &B256::ZERO, &keccak256([0u8]));
        assert_eq!(derived, address!("4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38"));
    }

    #[test]
    fn test_create2_mainnet_pair() {
        // https://info.uniswap.org/pair/0x3e8468f66d30fc99f745481d4b383f89861702c6
        let factory = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
        let init_code_hash =
            b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");
        let mut packed = [0u8; 40];
        packed[..20].copy_from_slice(address!("6810e776880c02933d47db1b9fc05908e5386b96").as_slice());
        packed[20..].copy_from_slice(address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").as_slice());

        assert_eq!(
            create2(factory, &keccak256(packed), &init_code_hash),
            address!("3e8468f66d30fc99f745481d4b383f89861702c6")
        );
    }

    #[test]
    fn test_pool_address_follows_pool_identity() {
        let deriver = PoolAddressDeriver::new(Address::repeat_byte(0xfa), B256::repeat_byte(0x11));
        let a = Token::new(1, Address::repeat_byte(0x01), 18);
        let b = Token::new(1, Address::repeat_byte(0x02), 6);

        let address = deriver.pool_address(&a, &b, 50, 20).unwrap();
        assert_eq!(deriver.pool_address(&b, &a, 50, 20).unwrap(), address);
        assert_eq!(deriver.pool_address(&b, &a, 20, 20).unwrap(), deriver.pool_address(&a, &b, 80, 20).unwrap());
        assert_ne!(deriver.pool_address(&a, &b, 50, 30).unwrap(), address);
        assert_ne!(deriver.pool_address(&a, &b, 60, 20).unwrap(), address);
        assert!(matches!(
            deriver.pool_address(&a, &b, 0, 20),
            Err(DataError::Amm(amm::AmmError::InvalidWeight(0)))
        ));
    }
}
