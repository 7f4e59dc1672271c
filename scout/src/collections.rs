//! Curated NFT collection catalog.
//!
//! Collections are static catalog data from the `[[collections]]` section of
//! the configuration file, validated against the chain table at startup and
//! grouped per chain for serving. No on-chain metadata is fetched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::{Address, short_digest};
use crate::chain::ClientRegistry;
use crate::error::Error;

/// A single `[[collections]]` entry as it appears in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Slug of the chain the collection lives on.
    pub chain: String,
    /// Contract address of the collection.
    pub address: String,
    /// Display name.
    pub name: String,
}

/// A catalog entry enriched for serving.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Stable short identifier derived from chain and contract address.
    pub id: String,
    /// Contract address of the collection.
    pub address: Address,
    /// Display name.
    pub name: String,
    /// Deep link into the chain's block explorer.
    pub explorer_url: String,
}

/// Per-chain index of curated collections, built once at startup.
#[derive(Debug, Default)]
pub struct CollectionIndex {
    by_chain: HashMap<String, Vec<Collection>>,
    total: usize,
}

impl CollectionIndex {
    /// Validate config entries against the chain table and group them by
    /// chain.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown chain slug, an invalid
    /// contract address, or an empty display name.
    pub fn build(entries: &[CollectionConfig], registry: &ClientRegistry) -> Result<Self, Error> {
        let mut by_chain: HashMap<String, Vec<Collection>> = HashMap::new();
        for entry in entries {
            let chain = registry.chain(&entry.chain).ok_or_else(|| {
                Error::config(format!(
                    "collection '{}' references unknown chain '{}'",
                    entry.name, entry.chain
                ))
            })?;
            if entry.name.trim().is_empty() {
                return Err(Error::config(format!(
                    "collection on chain '{}' has an empty name",
                    entry.chain
                )));
            }
            let address: Address = entry.address.parse().map_err(|_| {
                Error::config(format!(
                    "collection '{}': invalid address '{}'",
                    entry.name, entry.address
                ))
            })?;

            let collection = Collection {
                id: short_digest(&format!("{}:{}", chain.slug, address.as_str())),
                explorer_url: format!(
                    "{}/address/{address}",
                    chain.explorer.trim_end_matches('/')
                ),
                address,
                name: entry.name.clone(),
            };
            by_chain.entry(chain.slug.clone()).or_default().push(collection);
        }

        let total = by_chain.values().map(Vec::len).sum();
        Ok(Self { by_chain, total })
    }

    /// Collections curated for a chain; empty when none are configured.
    #[must_use]
    pub fn for_chain(&self, slug: &str) -> &[Collection] {
        self.by_chain.get(slug).map_or(&[], Vec::as_slice)
    }

    /// Total number of indexed collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total
    }

    /// Whether the index holds no collections at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
