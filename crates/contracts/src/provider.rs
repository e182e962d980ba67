//! alloy-backed bindings over an HTTP JSON-RPC provider

use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::http::reqwest::Url;
use alloy::transports::http::{Client, Http};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use metamoney_core::{ContractError, ContractResult, CoreError, CoreResult, NetworkId};

use crate::abi::{IMetaMoneyMarket, IERC20};
use crate::bindings::{Contracts, Erc20, MoneyMarket};

pub type HttpProvider = RootProvider<Http<Client>>;

/// Build a provider for `rpc_url`
pub fn http_provider(rpc_url: &str) -> CoreResult<HttpProvider> {
    let url: Url = rpc_url
        .parse()
        .map_err(|e| CoreError::InvalidConfig(format!("invalid rpc url {}: {}", rpc_url, e)))?;

    info!("Using JSON-RPC endpoint {}", rpc_url);
    Ok(ProviderBuilder::new().on_http(url))
}

/// Ask the provider which network it is on
pub async fn network_id(provider: &HttpProvider) -> ContractResult<NetworkId> {
    let id = provider
        .get_chain_id()
        .await
        .map_err(|e| ContractError::call("eth_chainId", e))?;
    Ok(NetworkId(id))
}

/// Bind both contract interfaces to one provider
pub fn bind(provider: HttpProvider, money_market: Address) -> Contracts {
    Contracts::new(
        Arc::new(RpcMoneyMarket::new(money_market, provider.clone())),
        Arc::new(RpcErc20::new(provider)),
    )
}

/// Money market binding
pub struct RpcMoneyMarket {
    contract: IMetaMoneyMarket::IMetaMoneyMarketInstance<Http<Client>, HttpProvider>,
}

impl RpcMoneyMarket {
    pub fn new(address: Address, provider: HttpProvider) -> Self {
        Self {
            contract: IMetaMoneyMarket::new(address, provider),
        }
    }
}

#[async_trait]
impl MoneyMarket for RpcMoneyMarket {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn supported_markets_count(&self) -> ContractResult<u64> {
        let count = self
            .contract
            .supportedMarketsCount()
            .call()
            .await
            .map_err(|e| ContractError::call("supportedMarketsCount", e))?
            ._0;

        u64::try_from(count).map_err(|_| ContractError::Overflow {
            method: "supportedMarketsCount",
            value: count.to_string(),
        })
    }

    async fn supported_markets_list(&self, index: u64) -> ContractResult<Address> {
        let address = self
            .contract
            .supportedMarketsList(U256::from(index))
            .call()
            .await
            .map_err(|e| ContractError::call("supportedMarketsList", e))?
            ._0;

        debug!("Market #{} at {}", index, address);
        Ok(address)
    }

    async fn get_market_symbol(&self, token: Address) -> ContractResult<String> {
        Ok(self
            .contract
            .getMarketSymbol(token)
            .call()
            .await
            .map_err(|e| ContractError::call("getMarketSymbol", e))?
            ._0)
    }

    async fn get_best_interest_rate(&self, token: Address) -> ContractResult<U256> {
        Ok(self
            .contract
            .getBestInterestRate(token)
            .call()
            .await
            .map_err(|e| ContractError::call("getBestInterestRate", e))?
            ._0)
    }

    async fn get_deposited_amount(&self, token: Address, account: Address) -> ContractResult<U256> {
        Ok(self
            .contract
            .getDepositedAmount(token, account)
            .call()
            .await
            .map_err(|e| ContractError::call("getDepositedAmount", e))?
            ._0)
    }
}

/// ERC-20 binding, bound to a token address per call
pub struct RpcErc20 {
    provider: HttpProvider,
}

impl RpcErc20 {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    fn at(&self, token: Address) -> IERC20::IERC20Instance<Http<Client>, HttpProvider> {
        IERC20::new(token, self.provider.clone())
    }
}

#[async_trait]
impl Erc20 for RpcErc20 {
    async fn balance_of(&self, token: Address, account: Address) -> ContractResult<U256> {
        Ok(self
            .at(token)
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| ContractError::call("balanceOf", e))?
            ._0)
    }

    async fn decimals(&self, token: Address) -> ContractResult<u8> {
        Ok(self
            .at(token)
            .decimals()
            .call()
            .await
            .map_err(|e| ContractError::call("decimals", e))?
            ._0)
    }
}
