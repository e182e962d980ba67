//! Configuration types

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Connector, CoreError, CoreResult, KnownSymbol, NetworkId};

/// RPC endpoint and contract location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// Expected network; taken from the provider when absent
    #[serde(default)]
    pub network_id: Option<NetworkId>,
    pub money_market: Address,
}

/// Price quote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub cache_ttl_secs: u64,
    pub timeout_ms: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.nomics.com/v1".to_string(),
            api_key: None,
            cache_ttl_secs: 60,
            timeout_ms: 5_000,
        }
    }
}

impl PriceConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Market refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    #[serde(default)]
    pub account: Option<Address>,
    #[serde(default)]
    pub connector: Connector,
    #[serde(default)]
    pub prices: PriceConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Extra fallback symbols on top of the built-in table
    #[serde(default)]
    pub symbols: Vec<KnownSymbol>,
}

impl AppConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.network.rpc_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig("network.rpc_url is empty".to_string()));
        }
        if self.refresh.interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "refresh.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.account.is_some() && self.connector.is_read_only() {
            return Err(CoreError::InvalidConfig(format!(
                "connector {} is read-only and cannot use an account",
                self.connector
            )));
        }
        Ok(())
    }
}
