//! Configuration for the provider.

use std::time::Duration;

use hub_sign_primitives::address::is_checksum_address;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// The configuration values that dictate the behavior of the provider.
///
/// A provider cannot be constructed from a config that fails
/// [`ProviderConfig::validate`], so holding a provider implies these values
/// are well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The checksummed address of the account whose signature the hub will
    /// collect.
    pub from: String,

    /// The node endpoint that non-signing calls are forwarded to, e.g. an
    /// Infura URL or a local node.
    pub endpoint: String,

    /// The target network identifier, a positive integer in string form as
    /// supplied by web3 tooling.
    pub network_id: String,

    /// How long to wait for the hub's completion notification before giving
    /// up on a signing call.
    ///
    /// `None` preserves the historical behavior of waiting indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Creates a config with the three required fields and no signing
    /// timeout.
    pub fn new(from: &str, endpoint: &str, network_id: &str) -> Self {
        Self {
            from: from.to_owned(),
            endpoint: endpoint.to_owned(),
            network_id: network_id.to_owned(),
            sign_timeout: None,
        }
    }

    /// Sets the signing timeout and returns the updated config.
    ///
    /// Useful for a builder pattern with dotchaining.
    pub fn with_sign_timeout(mut self, timeout: Duration) -> Self {
        self.sign_timeout = Some(timeout);
        self
    }

    /// Checks the config, short-circuiting on the first failure.
    ///
    /// The checks run in a fixed order: signer address, endpoint, network
    /// id. Each failure carries a message naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.from.is_empty() || !is_checksum_address(&self.from) {
            return Err(ConfigError::InvalidFromAddress(self.from.clone()));
        }
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        match self.network_id.parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(ConfigError::InvalidNetworkId(self.network_id.clone())),
        }
    }
}
