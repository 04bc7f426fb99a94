//! On-chain data collaborator for the `amm` library.
//!
//! Resolves token decimals and pool reserves, either from contracts through
//! an [`calls::EthCall`] implementation or from an offline TOML snapshot, and
//! assembles them into [`amm::Pool`]s.

pub mod address;
pub mod calls;
pub mod decimals;
pub mod error;
pub mod reserves;
pub mod snapshot;

pub use address::PoolAddressDeriver;
pub use calls::{ContractSource, EthCall};
pub use decimals::{DecimalsCache, DecimalsResolver};
pub use error::DataError;
pub use reserves::{DecimalsSource, PoolLoader, ReserveSource};
pub use snapshot::{Snapshot, SnapshotSource};
