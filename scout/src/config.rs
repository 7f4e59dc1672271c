//! Configuration loading and default template generation.
//!
//! # Configuration File Format
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//!
//! [chains.ethereum]
//! id = 1
//! name = "Ethereum"
//! rpc_url = "https://eth.llamarpc.com"
//! explorer = "https://etherscan.io"
//!
//! [[collections]]
//! chain = "ethereum"
//! address = "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d"
//! name = "Bored Ape Yacht Club"
//! ```
//!
//! `rpc_url` values support environment variable references (`$VAR` or
//! `${VAR}`), resolved at load time so endpoint API keys stay out of the
//! file. Host and port fall back to the `HOST` / `PORT` environment
//! variables, then to hardcoded defaults.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use serde::Deserialize;

use crate::chain::ChainsConfig;
use crate::collections::CollectionConfig;
use crate::error::Error;

/// Server configuration combining bind address, chain table, and the
/// curated collection catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    host: IpAddr,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    chains: ChainsConfig,
    #[serde(default)]
    collections: Vec<CollectionConfig>,
}

impl Config {
    /// Bind address.
    #[must_use]
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Bind port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The validated chain table.
    #[must_use]
    pub fn chains(&self) -> &ChainsConfig {
        &self.chains
    }

    /// Curated collection entries.
    #[must_use]
    pub fn collections(&self) -> &[CollectionConfig] {
        &self.collections
    }
}

fn default_host() -> IpAddr {
    std::env::var("HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
}

/// Load configuration from a TOML file at the given path.
///
/// # Errors
///
/// Returns a configuration error if the file cannot be resolved, read,
/// parsed, or validated.
pub fn load_config(path: &Path) -> Result<Config, Error> {
    let config_path = path.canonicalize().map_err(|e| {
        Error::config(format!(
            "Failed to resolve config path '{}': {e}",
            path.display()
        ))
    })?;
    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {e}",
            config_path.display()
        ))
    })?;
    parse_config(&content)
}

/// Parse and finalize a TOML configuration document.
///
/// Finalization resolves environment variable references in RPC URLs and
/// validates the chain table, so the rest of the application only ever sees
/// a well-formed configuration.
///
/// # Errors
///
/// Returns a configuration error on TOML syntax errors, dangling environment
/// references, or chain table violations.
pub fn parse_config(content: &str) -> Result<Config, Error> {
    let mut config: Config = toml::from_str(content)
        .map_err(|e| Error::config(format!("Failed to parse TOML config: {e}")))?;
    for chain in &mut config.chains.0 {
        chain.rpc_url = resolve_env(&chain.rpc_url)?;
    }
    config.chains.validate()?;
    Ok(config)
}

/// Resolve an environment-variable reference (`$VAR` or `${VAR}`), returning
/// the literal string unchanged if it does not match either pattern.
fn resolve_env(value: &str) -> Result<String, Error> {
    // ${VAR} syntax
    if let Some(inner) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        return std::env::var(inner).map_err(|_| {
            Error::config(format!(
                "env var '{inner}' not found (referenced as '{value}')"
            ))
        });
    }
    // $VAR syntax
    if let Some(name) = value.strip_prefix('$')
        && !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
    {
        return std::env::var(name).map_err(|_| {
            Error::config(format!(
                "env var '{name}' not found (referenced as '{value}')"
            ))
        });
    }
    // Literal value
    Ok(value.to_owned())
}

/// Generate a default TOML configuration template.
#[must_use]
pub fn generate_default_config() -> String {
    r#"# Airdrop Scout Configuration

# Server bind address and port.
# Can also be set via HOST / PORT environment variables.
host = "0.0.0.0"
port = 8080

# ── Supported chains ────────────────────────────────────────────────
# One [chains.<slug>] table per network. The slug is the identifier
# used in API paths. rpc_url supports environment variable references:
# "$VAR" or "${VAR}".

[chains.ethereum]
id = 1
name = "Ethereum"
rpc_url = "https://eth.llamarpc.com"
explorer = "https://etherscan.io"

[chains.base]
id = 8453
name = "Base"
rpc_url = "https://mainnet.base.org"
explorer = "https://basescan.org"

[chains.polygon]
id = 137
name = "Polygon"
rpc_url = "https://polygon-rpc.com"
explorer = "https://polygonscan.com"

# ── Curated NFT collections ─────────────────────────────────────────
# Each [[collections]] entry is listed under its chain's catalog.

[[collections]]
chain = "ethereum"
address = "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d"
name = "Bored Ape Yacht Club"
"#
    .to_owned()
}
