//! EVM address validation and small hashing helpers.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Error;

static ETH_ADDRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("Failed to initialize regexp for the eth address format")
});

/// A validated EVM account address, normalized to lowercase hex.
///
/// Checksum casing is accepted on input but not verified; the stored form is
/// always `0x` followed by 40 lowercase hex digits, so the type can double as
/// a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// The normalized `0x`-prefixed hex form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ETH_ADDRESS_REGEX.is_match(s) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(Error::config(format!("invalid address: '{s}'")))
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short stable digest of an input, for deterministic catalog identifiers.
#[must_use]
pub fn short_digest(input: &str) -> String {
    let digest = sha256::digest(input);
    digest.chars().take(16).collect()
}
