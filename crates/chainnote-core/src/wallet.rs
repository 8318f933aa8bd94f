//! Cardano wallet networks and address checks for wallet linking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cardano network a linked wallet lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletNetwork {
    Mainnet,
    Preprod,
    Preview,
}

impl WalletNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletNetwork::Mainnet => "mainnet",
            WalletNetwork::Preprod => "preprod",
            WalletNetwork::Preview => "preview",
        }
    }

    /// Bech32 human-readable prefixes accepted on this network.
    fn address_prefixes(&self) -> &'static [&'static str] {
        match self {
            WalletNetwork::Mainnet => &["addr1", "stake1"],
            WalletNetwork::Preprod | WalletNetwork::Preview => &["addr_test1", "stake_test1"],
        }
    }
}

impl fmt::Display for WalletNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletNetwork {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(WalletNetwork::Mainnet),
            "preprod" => Ok(WalletNetwork::Preprod),
            "preview" => Ok(WalletNetwork::Preview),
            other => Err(Error::InvalidInput(format!(
                "Unknown wallet network '{}': expected mainnet, preprod or preview",
                other
            ))),
        }
    }
}

/// Check that `address` looks like a bech32 Cardano address for `network`.
///
/// Only the human-readable prefix and character set are checked; the checksum
/// is left to the indexer.
pub fn validate_address(network: WalletNetwork, address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(Error::InvalidInput("Wallet address is required".to_string()));
    }
    if !address
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(Error::InvalidInput(
            "Wallet address must be lowercase bech32".to_string(),
        ));
    }
    let matches = network
        .address_prefixes()
        .iter()
        .any(|prefix| address.starts_with(prefix) && address.len() > prefix.len());
    if !matches {
        return Err(Error::InvalidInput(format!(
            "Address is not a {} address",
            network
        )));
    }
    Ok(())
}
