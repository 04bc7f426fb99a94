//! Fungible asset definitions.
//!
//! An [`Asset`] is either the chain's native currency or an ERC-20 style
//! [`Token`] identified by `(chain_id, address)`.

use crate::error::{AmmError, Result};
use alloy_primitives::Address;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An ERC-20 style token.
///
/// Two tokens are equal when they share a chain id and an address; decimals,
/// symbol and name are metadata and do not take part in equality.
#[derive(Debug, Clone)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: Option<String>,
    pub name: Option<String>,
}

impl Token {
    pub fn new(chain_id: u64, address: Address, decimals: u8) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: None,
            name: None,
        }
    }

    /// Parse a token from a hex address string.
    ///
    /// Mixed-case input must carry a valid EIP-55 checksum; all-lowercase or
    /// all-uppercase input is accepted as is.
    pub fn from_hex(chain_id: u64, address: &str, decimals: u8) -> Result<Self> {
        Ok(Self::new(chain_id, parse_address(address)?, decimals))
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this token comes first in the canonical pool ordering.
    ///
    /// Fails with [`AmmError::ChainMismatch`] across chains and with
    /// [`AmmError::IdenticalAssets`] when both tokens share an address.
    pub fn sorts_before(&self, other: &Token) -> Result<bool> {
        if self.chain_id != other.chain_id {
            return Err(AmmError::ChainMismatch {
                left: self.chain_id,
                right: other.chain_id,
            });
        }
        if self.address == other.address {
            return Err(AmmError::IdenticalAssets(self.address));
        }
        // Byte order on the address is the same as comparing lowercase hex.
        Ok(self.address < other.address)
    }

    /// EIP-55 checksummed address.
    pub fn checksummed(&self) -> String {
        self.address.to_checksum(None)
    }
}

/// Parse a 20-byte hex address, validating the checksum of mixed-case input.
pub fn parse_address(address: &str) -> Result<Address> {
    let hex = address.strip_prefix("0x").unwrap_or(address);
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    let parsed = if has_lower && has_upper {
        Address::parse_checksummed(address, None).map_err(|e| e.to_string())
    } else {
        Address::from_str(address).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| AmmError::InvalidAddress(format!("{address}: {reason}")))
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{symbol}"),
            None => write!(f, "{}", self.checksummed()),
        }
    }
}

/// The native currency of a chain (e.g. ETH on mainnet).
///
/// There is exactly one native currency per chain, so two natives are equal
/// when their chain ids match.
#[derive(Debug, Clone)]
pub struct NativeCurrency {
    pub chain_id: u64,
    pub decimals: u8,
    pub symbol: Option<String>,
    pub name: Option<String>,
}

impl NativeCurrency {
    pub fn new(chain_id: u64, decimals: u8) -> Self {
        Self {
            chain_id,
            decimals,
            symbol: None,
            name: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

impl PartialEq for NativeCurrency {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id
    }
}

impl Eq for NativeCurrency {}

impl Hash for NativeCurrency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
    }
}

/// Either the native currency or a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Asset {
    Native(NativeCurrency),
    Token(Token),
}

impl Asset {
    pub fn chain_id(&self) -> u64 {
        match self {
            Asset::Native(native) => native.chain_id,
            Asset::Token(token) => token.chain_id,
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Asset::Native(native) => native.decimals,
            Asset::Token(token) => token.decimals,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Asset::Native(native) => native.symbol.as_deref(),
            Asset::Token(token) => token.symbol.as_deref(),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native(_))
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Asset::Token(token) => Some(token),
            Asset::Native(_) => None,
        }
    }

    /// The token behind this asset, or [`AmmError::NativeAssetInPool`].
    pub(crate) fn require_token(&self) -> Result<&Token> {
        self.as_token().ok_or(AmmError::NativeAssetInPool)
    }
}

impl From<Token> for Asset {
    fn from(token: Token) -> Self {
        Asset::Token(token)
    }
}

impl From<NativeCurrency> for Asset {
    fn from(native: NativeCurrency) -> Self {
        Asset::Native(native)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native(native) => match &native.symbol {
                Some(symbol) => write!(f, "{symbol}"),
                None => write!(f, "native({})", native.chain_id),
            },
            Asset::Token(token) => write!(f, "{token}"),
        }
    }
}
