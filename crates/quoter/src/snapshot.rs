//! Offline pool snapshots stored as TOML.
//!
//! ```toml
//! chain_id = 1
//! factory = "0x..."
//! init_code_hash = "0x..."
//!
//! [[tokens]]
//! address = "0x..."
//! decimals = 6
//! symbol = "USDC"
//!
//! [[pools]]
//! token_a = "0x..."
//! token_b = "0x..."
//! weight = 50
//! fee_bps = 20
//! reserve0 = "1000000000"
//! reserve1 = "1000000000000000000"
//! ```
//!
//! Reserves are listed in canonical token order, like the pools report them.

use crate::address::PoolAddressDeriver;
use crate::error::DataError;
use crate::reserves::{DecimalsSource, ReserveSource};
use alloy_primitives::{Address, B256};
use amm::{parse_address, Token, DEFAULT_FEE_BPS, DEFAULT_WEIGHT};
use num_bigint::BigInt;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub chain_id: u64,
    pub factory: String,
    pub init_code_hash: String,
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub address: String,
    pub decimals: u8,
    pub symbol: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolEntry {
    pub token_a: String,
    pub token_b: String,
    /// Weight of `token_a`.
    #[serde(default = "default_weight")]
    pub weight: u8,
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u16,
    pub reserve0: String,
    pub reserve1: String,
}

fn default_weight() -> u8 {
    DEFAULT_WEIGHT
}

fn default_fee_bps() -> u16 {
    DEFAULT_FEE_BPS
}

impl PoolEntry {
    pub fn token_addresses(&self) -> Result<(Address, Address), DataError> {
        Ok((parse_address(&self.token_a)?, parse_address(&self.token_b)?))
    }
}

impl Snapshot {
    pub fn from_toml(contents: &str) -> Result<Self, DataError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn deriver(&self) -> Result<PoolAddressDeriver, DataError> {
        let init_code_hash = B256::from_str(&self.init_code_hash).map_err(|err| {
            DataError::Snapshot(format!("init_code_hash {:?}: {err}", self.init_code_hash))
        })?;
        Ok(PoolAddressDeriver::new(
            parse_address(&self.factory)?,
            init_code_hash,
        ))
    }

    /// The token table, with metadata.
    pub fn tokens(&self) -> Result<Vec<Token>, DataError> {
        self.tokens
            .iter()
            .map(|entry| {
                let mut token = Token::from_hex(self.chain_id, &entry.address, entry.decimals)?;
                token.symbol = entry.symbol.clone();
                token.name = entry.name.clone();
                Ok(token)
            })
            .collect()
    }

    /// Find a token by symbol (case-insensitive) or address.
    pub fn find_token(&self, query: &str) -> Result<Token, DataError> {
        let tokens = self.tokens()?;
        if let Some(token) = tokens.iter().find(|token| {
            token
                .symbol
                .as_deref()
                .is_some_and(|symbol| symbol.eq_ignore_ascii_case(query))
        }) {
            return Ok(token.clone());
        }
        let address = parse_address(query).map_err(|_| DataError::UnknownToken(query.to_string()))?;
        tokens
            .into_iter()
            .find(|token| token.address == address)
            .ok_or_else(|| DataError::UnknownToken(query.to_string()))
    }

    /// An offline source answering from this snapshot.
    pub fn source(&self) -> Result<SnapshotSource, DataError> {
        let deriver = self.deriver()?;
        let tokens = self.tokens()?;
        let decimals: HashMap<_, _> = tokens
            .iter()
            .map(|token| ((token.chain_id, token.address), token.decimals))
            .collect();

        let mut reserves = HashMap::new();
        for entry in &self.pools {
            let (a, b) = entry.token_addresses()?;
            let lookup = |address: Address| {
                tokens
                    .iter()
                    .find(|token| token.address == address)
                    .cloned()
                    .ok_or_else(|| DataError::UnknownToken(address.to_string()))
            };
            let pool = deriver.pool_address(&lookup(a)?, &lookup(b)?, entry.weight, entry.fee_bps)?;
            reserves.insert(pool, (parse_raw(&entry.reserve0)?, parse_raw(&entry.reserve1)?));
        }
        Ok(SnapshotSource { decimals, reserves })
    }
}

fn parse_raw(value: &str) -> Result<BigInt, DataError> {
    BigInt::from_str(value)
        .map_err(|err| DataError::Snapshot(format!("reserve {value:?}: {err}")))
}

/// Reserves and decimals captured in a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    decimals: HashMap<(u64, Address), u8>,
    reserves: HashMap<Address, (BigInt, BigInt)>,
}

impl ReserveSource for SnapshotSource {
    fn reserves(&self, pool: Address) -> Result<(BigInt, BigInt), DataError> {
        self.reserves
            .get(&pool)
            .cloned()
            .ok_or_else(|| DataError::Snapshot(format!("no reserves recorded for pool {pool}")))
    }
}

impl DecimalsSource for SnapshotSource {
    fn decimals(&self, chain_id: u64, token: Address) -> Result<u8, DataError> {
        self.decimals
            .get(&(chain_id, token))
            .copied()
            .ok_or_else(|| DataError::Snapshot(format!("no decimals recorded for {token}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
chain_id = 1
factory = "0xfafafafafafafafafafafafafafafafafafafafa"
init_code_hash = "0x1111111111111111111111111111111111111111111111111111111111111111"

[[tokens]]
address = "0x0101010101010101010101010101010101010101"
decimals = 6
symbol = "USDC"

[[tokens]]
address = "0x0202020202020202020202020202020202020202"
decimals = 18
symbol = "WETH"
name = "Wrapped Ether"

[[pools]]
token_a = "0x0202020202020202020202020202020202020202"
token_b = "0x0101010101010101010101010101010101010101"
weight = 80
fee_bps = 30
reserve0 = "5000000000"
reserve1 = "10000000000000000000"
"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = Snapshot::from_toml(SNAPSHOT).unwrap();
        assert_eq!(snapshot.chain_id, 1);
        assert_eq!(snapshot.pools.len(), 1);

        let tokens = snapshot.tokens().unwrap();
        assert_eq!(tokens[1].name.as_deref(), Some("Wrapped Ether"));
        assert_eq!(snapshot.find_token("weth").unwrap(), tokens[1]);
        assert_eq!(
            snapshot.find_token("0x0101010101010101010101010101010101010101").unwrap(),
            tokens[0]
        );
        assert!(matches!(snapshot.find_token("DAI"), Err(DataError::UnknownToken(_))));
    }

    #[test]
    fn test_defaults_for_pool_params() {
        let contents = SNAPSHOT.replace("weight = 80\nfee_bps = 30\n", "");
        let snapshot = Snapshot::from_toml(&contents).unwrap();
        assert_eq!(snapshot.pools[0].weight, 50);
        assert_eq!(snapshot.pools[0].fee_bps, 20);
    }

    #[test]
    fn test_source_answers_by_derived_address() {
        let snapshot = Snapshot::from_toml(SNAPSHOT).unwrap();
        let source = snapshot.source().unwrap();
        let tokens = snapshot.tokens().unwrap();
        let pool = snapshot
            .deriver()
            .unwrap()
            .pool_address(&tokens[1], &tokens[0], 80, 30)
            .unwrap();

        let (r0, r1) = source.reserves(pool).unwrap();
        assert_eq!(r0, BigInt::from(5_000_000_000u64));
        assert_eq!(r1, BigInt::from(10u64.pow(19)));
        assert_eq!(source.decimals(1, tokens[0].address).unwrap(), 6);
        assert!(source.reserves(Address::ZERO).is_err());
    }

    #[test]
    fn test_invalid_snapshot() {
        assert!(matches!(Snapshot::from_toml("chain_id = \"one\""), Err(DataError::Toml(_))));

        let bad_reserve = SNAPSHOT.replace("\"5000000000\"", "\"5e9\"");
        let snapshot = Snapshot::from_toml(&bad_reserve).unwrap();
        assert!(matches!(snapshot.source(), Err(DataError::Snapshot(_))));
    }
}
