//! Market entries and snapshot merging

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{CoreError, CoreResult, Fetched, SymbolSource, TokenAmount};

/// One supported money market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub address: Address,
    pub symbol: String,
    pub symbol_source: SymbolSource,
    /// Percent per year
    pub interest_rate: f64,
    pub price: Fetched<f64>,
    pub decimals: Fetched<u8>,
    pub deposit_balance: Option<TokenAmount>,
    pub wallet_balance: Option<TokenAmount>,
}

impl Market {
    /// Price in USD, zero when the quote was unavailable
    pub fn price_usd(&self) -> f64 {
        self.price.value_or_default()
    }

    /// USD value of the deposited amount, if known
    pub fn deposit_value_usd(&self) -> Option<f64> {
        self.deposit_balance.map(|b| b.value_usd(self.price_usd()))
    }

    pub fn has_balances(&self) -> bool {
        self.deposit_balance.is_some() && self.wallet_balance.is_some()
    }

    /// Fold a fresher entry for the same market into this one.
    ///
    /// Every field comes from `incoming` except the two balances, which
    /// are only replaced when `incoming` actually carries them.
    pub fn merged_with(&self, incoming: &Market) -> Market {
        Market {
            deposit_balance: incoming.deposit_balance.or(self.deposit_balance),
            wallet_balance: incoming.wallet_balance.or(self.wallet_balance),
            ..incoming.clone()
        }
    }
}

/// All markets of one fetch pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub markets: Vec<Market>,
    pub account: Option<Address>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(markets: Vec<Market>, account: Option<Address>) -> Self {
        Self {
            markets,
            account,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

/// Reconcile a newly fetched market list against the held one.
///
/// Entries are joined on contract address. The result lists every incoming
/// market in incoming order, followed by markets only `previous` knows
/// about, in their previous order. Symbols play no part in the join, so
/// two markets sharing a symbol stay separate.
pub fn merge_markets(previous: &[Market], incoming: &[Market]) -> CoreResult<Vec<Market>> {
    let prev_by_address: HashMap<Address, &Market> =
        previous.iter().map(|m| (m.address, m)).collect();

    let mut incoming_by_address: HashMap<Address, &Market> = HashMap::with_capacity(incoming.len());
    for market in incoming {
        // first occurrence wins on duplicate addresses
        incoming_by_address.entry(market.address).or_insert(market);
    }

    let mut seen = HashSet::with_capacity(incoming.len());
    let mut merged = Vec::with_capacity(incoming.len().max(previous.len()));

    for address in incoming.iter().map(|m| m.address) {
        if !seen.insert(address) {
            continue;
        }

        let fresh = incoming_by_address
            .get(&address)
            .ok_or(CoreError::MergeInvariant(address))?;

        let entry = match prev_by_address.get(&address) {
            Some(old) => old.merged_with(fresh),
            None => (*fresh).clone(),
        };
        merged.push(entry);
    }

    for old in previous {
        if seen.insert(old.address) {
            merged.push(old.clone());
        }
    }

    Ok(merged)
}
