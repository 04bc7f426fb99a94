//! Token decimals resolution.

use crate::error::DataError;
use crate::reserves::DecimalsSource;
use alloy_primitives::Address;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Decimals learned from a source, keyed by `(chain_id, token)`.
///
/// The cache is owned by the caller and shared explicitly; it lives exactly as
/// long as the handles to it.
#[derive(Debug, Default)]
pub struct DecimalsCache {
    entries: RwLock<HashMap<(u64, Address), u8>>,
}

impl DecimalsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chain_id: u64, token: Address) -> Option<u8> {
        self.entries.read().get(&(chain_id, token)).copied()
    }

    pub fn insert(&self, chain_id: u64, token: Address, decimals: u8) {
        self.entries.write().insert((chain_id, token), decimals);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Resolves decimals from a static override table, then the cache, then the
/// source. Answers from the source are cached; overrides are not.
#[derive(Debug)]
pub struct DecimalsResolver<S> {
    overrides: HashMap<(u64, Address), u8>,
    cache: Arc<DecimalsCache>,
    source: S,
}

impl<S: DecimalsSource> DecimalsResolver<S> {
    pub fn new(source: S, cache: Arc<DecimalsCache>) -> Self {
        Self {
            overrides: HashMap::new(),
            cache,
            source,
        }
    }

    pub fn with_override(mut self, chain_id: u64, token: Address, decimals: u8) -> Self {
        self.overrides.insert((chain_id, token), decimals);
        self
    }

    pub fn cache(&self) -> &Arc<DecimalsCache> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resolve(&self, chain_id: u64, token: Address) -> Result<u8, DataError> {
        if let Some(&decimals) = self.overrides.get(&(chain_id, token)) {
            return Ok(decimals);
        }
        if let Some(decimals) = self.cache.get(chain_id, token) {
            debug!(%token, chain_id, decimals, "decimals cache hit");
            return Ok(decimals);
        }

        debug!(%token, chain_id, "decimals cache miss");
        let decimals = self
            .source
            .decimals(chain_id, token)
            .map_err(|err| DataError::Decimals {
                chain_id,
                token,
                reason: err.to_string(),
            })?;
        self.cache.insert(chain_id, token, decimals);
        Ok(decimals)
    }
}
