//! Chain configuration types and slug-keyed TOML (de)serialisation.

use std::collections::HashMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// TOML-level fields of a single `[chains.<slug>]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChainEntry {
    id: u64,
    name: String,
    rpc_url: String,
    explorer: String,
}

/// Immutable descriptor of a single supported chain.
///
/// One instance per supported chain, built from the configuration table at
/// process start. The `slug` is injected from the entry's table key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Short symbolic identifier, the `[chains.<slug>]` table key.
    pub slug: String,
    /// Numeric EIP-155 chain id.
    pub id: u64,
    /// Human-readable display name.
    pub name: String,
    /// HTTP(S) JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Block explorer base URL.
    pub explorer: String,
}

impl From<&ChainConfig> for ChainEntry {
    fn from(chain: &ChainConfig) -> Self {
        Self {
            id: chain.id,
            name: chain.name.clone(),
            rpc_url: chain.rpc_url.clone(),
            explorer: chain.explorer.clone(),
        }
    }
}

/// Ordered collection of [`ChainConfig`] entries.
///
/// Serialised as a TOML map keyed by chain slug.
#[derive(Debug, Clone, Default)]
pub struct ChainsConfig(pub Vec<ChainConfig>);

impl ChainsConfig {
    /// Check the table invariants: non-empty fields, well-formed URLs, and
    /// no duplicate numeric chain ids. Slug duplicates are unrepresentable
    /// since entries are keyed by slug in the TOML map.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending entry.
    pub fn validate(&self) -> Result<(), Error> {
        let mut ids: HashMap<u64, &str> = HashMap::new();
        for chain in &self.0 {
            if chain.slug.trim().is_empty() {
                return Err(Error::config("chain slug must not be empty"));
            }
            if chain.name.trim().is_empty() {
                return Err(Error::config(format!(
                    "chain '{}': name must not be empty",
                    chain.slug
                )));
            }
            Url::parse(&chain.rpc_url).map_err(|e| {
                Error::config(format!(
                    "chain '{}': invalid rpc_url '{}': {e}",
                    chain.slug, chain.rpc_url
                ))
            })?;
            Url::parse(&chain.explorer).map_err(|e| {
                Error::config(format!(
                    "chain '{}': invalid explorer '{}': {e}",
                    chain.slug, chain.explorer
                ))
            })?;
            if let Some(previous) = ids.insert(chain.id, &chain.slug) {
                return Err(Error::config(format!(
                    "chain id {} is used by both '{previous}' and '{}'",
                    chain.id, chain.slug
                )));
            }
        }
        Ok(())
    }
}

impl Deref for ChainsConfig {
    type Target = Vec<ChainConfig>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for ChainsConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for chain in &self.0 {
            map.serialize_entry(&chain.slug, &ChainEntry::from(chain))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChainsConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use std::fmt;

        use serde::de::{MapAccess, Visitor};

        struct ChainsVisitor;

        impl<'de> Visitor<'de> for ChainsVisitor {
            type Value = ChainsConfig;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of chain slugs to chain configurations")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut chains = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((slug, entry)) = access.next_entry::<String, ChainEntry>()? {
                    chains.push(ChainConfig {
                        slug,
                        id: entry.id,
                        name: entry.name,
                        rpc_url: entry.rpc_url,
                        explorer: entry.explorer,
                    });
                }
                Ok(ChainsConfig(chains))
            }
        }

        deserializer.deserialize_map(ChainsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(slug: &str, id: u64) -> ChainConfig {
        ChainConfig {
            slug: slug.to_owned(),
            id,
            name: slug.to_owned(),
            rpc_url: format!("https://rpc.{slug}.example"),
            explorer: format!("https://scan.{slug}.example"),
        }
    }

    #[test]
    fn deserializes_slug_keyed_map() {
        let toml = r#"
            [ethereum]
            id = 1
            name = "Ethereum"
            rpc_url = "https://eth.example"
            explorer = "https://etherscan.io"

            [base]
            id = 8453
            name = "Base"
            rpc_url = "https://mainnet.base.org"
            explorer = "https://basescan.org"
        "#;
        let chains: ChainsConfig = toml::from_str(toml).expect("table should parse");
        assert_eq!(chains.len(), 2);
        let eth = chains
            .iter()
            .find(|c| c.slug == "ethereum")
            .expect("ethereum entry");
        assert_eq!(eth.id, 1);
        assert_eq!(eth.name, "Ethereum");
        assert_eq!(eth.rpc_url, "https://eth.example");
    }

    #[test]
    fn serializes_back_to_slug_keyed_map() {
        let chains = ChainsConfig(vec![chain("ethereum", 1), chain("base", 8453)]);
        let rendered = toml::to_string(&chains).expect("table should serialize");
        let parsed: ChainsConfig = toml::from_str(&rendered).expect("round trip");
        assert_eq!(parsed.0, chains.0);
    }

    #[test]
    fn validate_accepts_well_formed_table() {
        let chains = ChainsConfig(vec![chain("ethereum", 1), chain("base", 8453)]);
        chains.validate().expect("table should be valid");
    }

    #[test]
    fn validate_rejects_duplicate_numeric_ids() {
        let chains = ChainsConfig(vec![chain("ethereum", 1), chain("mirror", 1)]);
        let err = chains.validate().expect_err("duplicate id should fail");
        assert!(err.to_string().contains("chain id 1"));
    }

    #[test]
    fn validate_rejects_empty_name() {
        let mut bad = chain("ethereum", 1);
        bad.name = "  ".to_owned();
        let chains = ChainsConfig(vec![bad]);
        assert!(chains.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_rpc_url() {
        let mut bad = chain("ethereum", 1);
        bad.rpc_url = "not a url".to_owned();
        let chains = ChainsConfig(vec![bad]);
        let err = chains.validate().expect_err("bad url should fail");
        assert!(err.to_string().contains("invalid rpc_url"));
    }
}
