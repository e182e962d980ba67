//! Known token symbols
//!
//! Some deployed tokens (MKR, SAI) return `bytes32` from `symbol()`, so the
//! money market cannot read their symbol as a string. This table is the
//! fallback consulted when the on-chain lookup fails.

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::NetworkId;

/// Placeholder symbol for markets that no source could name
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// One known (network, address) -> symbol entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownSymbol {
    pub network_id: NetworkId,
    pub address: Address,
    pub symbol: String,
}

/// Well-known token symbols per network
static BUILTIN_SYMBOLS: LazyLock<Vec<KnownSymbol>> = LazyLock::new(|| {
    vec![
        KnownSymbol {
            network_id: NetworkId::MAINNET,
            address: address!("9f8F72aA9304c8B593d555F12eF6589cC3A579A2"),
            symbol: "MKR".to_string(),
        },
        KnownSymbol {
            network_id: NetworkId::MAINNET,
            address: address!("89d24A6b4CcB1B6fAA2625fE562bDD9a23260359"),
            symbol: "SAI".to_string(),
        },
    ]
});

/// Symbol fallback lookup keyed by (network, address)
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<(NetworkId, Address), String>,
}

impl SymbolTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table preloaded with the built-in entries
    pub fn builtin() -> Self {
        Self::new().with_entries(BUILTIN_SYMBOLS.iter().cloned())
    }

    pub fn with_symbol(mut self, network_id: NetworkId, address: Address, symbol: &str) -> Self {
        self.insert(network_id, address, symbol);
        self
    }

    pub fn with_entries(mut self, entries: impl IntoIterator<Item = KnownSymbol>) -> Self {
        for entry in entries {
            self.insert(entry.network_id, entry.address, &entry.symbol);
        }
        self
    }

    pub fn insert(&mut self, network_id: NetworkId, address: Address, symbol: &str) {
        self.entries.insert((network_id, address), symbol.to_string());
    }

    pub fn get_symbol(&self, network_id: NetworkId, address: Address) -> Option<&str> {
        self.entries.get(&(network_id, address)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
