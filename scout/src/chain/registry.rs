//! Chain-scoped RPC client registry.
//!
//! One [`RpcClient`] is constructed per distinct chain slug for the lifetime
//! of the process and handed out behind an `Arc`, so repeated requests reuse
//! the same transport configuration instead of rebuilding it. The registry is
//! owned by server startup and injected into request handlers, never held as
//! ambient global state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::config::{ChainConfig, ChainsConfig};
use super::rpc::RpcClient;
use crate::error::Error;

/// Fixed per-request transport timeout applied to every constructed client.
pub const RPC_TIMEOUT: Duration = Duration::from_millis(8_000);

/// Lazily filled cache of per-chain RPC clients.
///
/// Holds its own copy of the validated chain table; later changes to the
/// source configuration cannot affect handles already constructed.
#[derive(Debug)]
pub struct ClientRegistry {
    chains: HashMap<String, ChainConfig>,
    clients: RwLock<HashMap<String, Arc<RpcClient>>>,
}

impl ClientRegistry {
    /// Build a registry over an already validated chain table.
    #[must_use]
    pub fn new(chains: &ChainsConfig) -> Self {
        let chains = chains
            .iter()
            .map(|chain| (chain.slug.clone(), chain.clone()))
            .collect();
        Self {
            chains,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the static descriptor for a chain slug.
    #[must_use]
    pub fn chain(&self, slug: &str) -> Option<&ChainConfig> {
        self.chains.get(slug)
    }

    /// Iterate over all configured chain descriptors (unordered).
    pub fn chains(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.values()
    }

    /// Return the client for `slug`, constructing and caching it on first
    /// use.
    ///
    /// Every caller observes the same handle for a given slug. An unknown
    /// slug fails before any construction is attempted and inserts nothing.
    /// A construction failure also leaves the cache untouched, so the next
    /// call retries.
    ///
    /// Two callers racing on the first request for the same chain may both
    /// construct a client; the insert is first-write-wins, so exactly one
    /// entry is retained and both callers receive it. The losing handle has
    /// opened no connection and is simply dropped.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedChain`] when `slug` is not configured, or a chain
    /// error if client construction fails.
    pub fn client(&self, slug: &str) -> Result<Arc<RpcClient>, Error> {
        if let Some(client) = self
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
        {
            return Ok(Arc::clone(client));
        }

        let config = self
            .chains
            .get(slug)
            .ok_or_else(|| Error::UnsupportedChain(slug.to_owned()))?;
        let client = Arc::new(RpcClient::new(config.clone(), RPC_TIMEOUT)?);

        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(clients.entry(slug.to_owned()).or_insert(client)))
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ChainsConfig {
        ChainsConfig(vec![
            ChainConfig {
                slug: "ethereum".to_owned(),
                id: 1,
                name: "Ethereum".to_owned(),
                rpc_url: "https://eth.example".to_owned(),
                explorer: "https://etherscan.io".to_owned(),
            },
            ChainConfig {
                slug: "base".to_owned(),
                id: 8453,
                name: "Base".to_owned(),
                rpc_url: "https://mainnet.base.org".to_owned(),
                explorer: "https://basescan.org".to_owned(),
            },
        ])
    }

    #[test]
    fn repeated_calls_return_the_same_handle() {
        let registry = ClientRegistry::new(&table());
        let first = registry.client("ethereum").expect("first call");
        let second = registry.client("ethereum").expect("second call");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached(), 1);
    }

    #[test]
    fn distinct_chains_get_distinct_clients() {
        let registry = ClientRegistry::new(&table());
        let eth = registry.client("ethereum").expect("ethereum client");
        let base = registry.client("base").expect("base client");
        assert!(!Arc::ptr_eq(&eth, &base));
        assert_eq!(eth.endpoint().as_str(), "https://eth.example/");
        assert_eq!(base.endpoint().as_str(), "https://mainnet.base.org/");
        assert_eq!(registry.cached(), 2);
    }

    #[test]
    fn unknown_chain_is_rejected_before_construction() {
        let registry = ClientRegistry::new(&table());
        let err = registry.client("dogecoin").expect_err("unknown chain");
        assert!(matches!(err, Error::UnsupportedChain(ref slug) if slug == "dogecoin"));
        assert_eq!(registry.cached(), 0);
    }

    #[test]
    fn cached_handle_outlives_the_source_table() {
        let mut source = table();
        let registry = ClientRegistry::new(&source);
        let before = registry.client("ethereum").expect("initial client");

        source.0.clear();

        let after = registry.client("ethereum").expect("client after mutation");
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn clients_carry_the_fixed_timeout() {
        let registry = ClientRegistry::new(&table());
        let client = registry.client("ethereum").expect("client");
        assert_eq!(client.timeout(), Duration::from_millis(8_000));
        assert_eq!(client.timeout(), RPC_TIMEOUT);
    }

    #[test]
    fn construction_failure_leaves_no_entry() {
        let chains = ChainsConfig(vec![ChainConfig {
            slug: "broken".to_owned(),
            id: 999,
            name: "Broken".to_owned(),
            rpc_url: "not a url".to_owned(),
            explorer: "https://scan.example".to_owned(),
        }]);
        let registry = ClientRegistry::new(&chains);
        assert!(registry.client("broken").is_err());
        assert_eq!(registry.cached(), 0);
        // A later call goes through construction again instead of hitting a
        // poisoned entry.
        assert!(registry.client("broken").is_err());
    }

    #[test]
    fn concurrent_first_access_retains_one_entry() {
        let registry = ClientRegistry::new(&table());
        let handles: Vec<Arc<RpcClient>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.client("ethereum").expect("client")))
                .collect();
            workers
                .into_iter()
                .map(|w| w.join().expect("worker should not panic"))
                .collect()
        });

        assert_eq!(registry.cached(), 1);
        let winner = registry.client("ethereum").expect("retained client");
        for handle in handles {
            assert!(Arc::ptr_eq(&handle, &winner));
        }
    }
}
