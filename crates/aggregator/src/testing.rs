//! In-memory bindings for tests

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use metamoney_contracts::{Contracts, Erc20, MoneyMarket};
use metamoney_core::{ContractError, ContractResult, PriceFeedError, PriceFeedResult};
use metamoney_price_feed::PriceLookup;

#[derive(Debug, Clone)]
pub struct MockMarket {
    pub address: Address,
    /// `None` makes `getMarketSymbol` revert
    pub symbol: Option<&'static str>,
    pub rate: U256,
    pub deposited: U256,
    pub balance: U256,
    /// `None` makes `decimals` revert
    pub decimals: Option<u8>,
}

impl MockMarket {
    pub fn new(byte: u8, symbol: &'static str) -> Self {
        Self {
            address: Address::repeat_byte(byte),
            symbol: Some(symbol),
            rate: U256::from(47_564_687_975u64),
            deposited: U256::from(1_000u64),
            balance: U256::from(2_000u64),
            decimals: Some(18),
        }
    }
}

#[derive(Default)]
pub struct MockChain {
    pub markets: Vec<MockMarket>,
    pub calls: AtomicUsize,
    /// Methods that revert on every call
    failing: Mutex<HashSet<&'static str>>,
    /// `supportedMarketsList` reverts from this index on
    failing_index: Mutex<Option<u64>>,
}

impl MockChain {
    pub fn new(markets: Vec<MockMarket>) -> Arc<Self> {
        Arc::new(Self {
            markets,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_on(&self, method: &'static str) {
        self.failing.lock().insert(method);
    }

    pub fn fail_list_at(&self, index: u64) {
        *self.failing_index.lock() = Some(index);
    }

    fn hit(&self, method: &'static str) -> ContractResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(method) {
            return Err(ContractError::call(method, "boom"));
        }
        Ok(())
    }

    fn find(&self, token: Address, method: &'static str) -> ContractResult<&MockMarket> {
        self.markets
            .iter()
            .find(|m| m.address == token)
            .ok_or_else(|| ContractError::call(method, "unsupported market"))
    }

    /// Bundle this chain as both bindings
    pub fn contracts(self: &Arc<Self>) -> Contracts {
        Contracts::new(
            Arc::clone(self) as Arc<dyn MoneyMarket>,
            Arc::clone(self) as Arc<dyn Erc20>,
        )
    }
}

#[async_trait]
impl MoneyMarket for MockChain {
    fn address(&self) -> Address {
        Address::repeat_byte(0xee)
    }

    async fn supported_markets_count(&self) -> ContractResult<u64> {
        self.hit("supportedMarketsCount")?;
        Ok(self.markets.len() as u64)
    }

    async fn supported_markets_list(&self, index: u64) -> ContractResult<Address> {
        self.hit("supportedMarketsList")?;
        let failing_from = *self.failing_index.lock();
        if failing_from.is_some_and(|from| index >= from) {
            return Err(ContractError::call("supportedMarketsList", "boom"));
        }
        self.markets
            .get(index as usize)
            .map(|m| m.address)
            .ok_or_else(|| ContractError::call("supportedMarketsList", "index out of range"))
    }

    async fn get_market_symbol(&self, token: Address) -> ContractResult<String> {
        self.hit("getMarketSymbol")?;
        self.find(token, "getMarketSymbol")?
            .symbol
            .map(str::to_string)
            .ok_or_else(|| ContractError::call("getMarketSymbol", "execution reverted"))
    }

    async fn get_best_interest_rate(&self, token: Address) -> ContractResult<U256> {
        self.hit("getBestInterestRate")?;
        Ok(self.find(token, "getBestInterestRate")?.rate)
    }

    async fn get_deposited_amount(&self, token: Address, _account: Address) -> ContractResult<U256> {
        self.hit("getDepositedAmount")?;
        Ok(self.find(token, "getDepositedAmount")?.deposited)
    }
}

#[async_trait]
impl Erc20 for MockChain {
    async fn balance_of(&self, token: Address, _account: Address) -> ContractResult<U256> {
        self.hit("balanceOf")?;
        Ok(self.find(token, "balanceOf")?.balance)
    }

    async fn decimals(&self, token: Address) -> ContractResult<u8> {
        self.hit("decimals")?;
        self.find(token, "decimals")?
            .decimals
            .ok_or_else(|| ContractError::call("decimals", "execution reverted"))
    }
}

/// Fixed price table; unknown symbols fail
#[derive(Default)]
pub struct MockPrices {
    pub prices: HashMap<String, f64>,
    pub requested: Mutex<Vec<String>>,
}

impl MockPrices {
    pub fn new(prices: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            requested: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PriceLookup for MockPrices {
    async fn get_price(&self, symbol: &str) -> PriceFeedResult<f64> {
        self.requested.lock().push(symbol.to_string());
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| PriceFeedError::NotFound(symbol.to_string()))
    }

    fn source(&self) -> &'static str {
        "mock"
    }
}
