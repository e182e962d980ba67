//! Contract binding traits
//!
//! Bindings are stateless proxies: every method is one remote call. The
//! aggregator only ever sees these traits, so tests can stand in for the
//! chain.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

use metamoney_core::ContractResult;

/// Read surface of the meta money market contract
#[async_trait]
pub trait MoneyMarket: Send + Sync {
    /// Deployed contract address
    fn address(&self) -> Address;

    async fn supported_markets_count(&self) -> ContractResult<u64>;

    /// Token address of the market at `index`
    async fn supported_markets_list(&self, index: u64) -> ContractResult<Address>;

    /// Fails for tokens whose `symbol()` is not a string
    async fn get_market_symbol(&self, token: Address) -> ContractResult<String>;

    /// Best rate across the underlying markets, per block, 1e18 scaled
    async fn get_best_interest_rate(&self, token: Address) -> ContractResult<U256>;

    async fn get_deposited_amount(&self, token: Address, account: Address) -> ContractResult<U256>;
}

/// Read surface of an ERC-20 token
#[async_trait]
pub trait Erc20: Send + Sync {
    async fn balance_of(&self, token: Address, account: Address) -> ContractResult<U256>;

    async fn decimals(&self, token: Address) -> ContractResult<u8>;
}

/// Bindings bound to one transport
#[derive(Clone)]
pub struct Contracts {
    /// `None` until the money market deployment is resolved
    pub money_market: Option<Arc<dyn MoneyMarket>>,
    pub erc20: Arc<dyn Erc20>,
}

impl Contracts {
    pub fn new(money_market: Arc<dyn MoneyMarket>, erc20: Arc<dyn Erc20>) -> Self {
        Self {
            money_market: Some(money_market),
            erc20,
        }
    }

    /// Token bindings only, money market not instantiated yet
    pub fn without_money_market(erc20: Arc<dyn Erc20>) -> Self {
        Self {
            money_market: None,
            erc20,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.money_market.is_some()
    }
}

impl std::fmt::Debug for Contracts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contracts")
            .field("money_market", &self.money_market.as_ref().map(|m| m.address()))
            .finish_non_exhaustive()
    }
}
