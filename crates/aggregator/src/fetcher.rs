//! Market snapshot fetching
//!
//! One pass reads every supported market in enumeration order, one market
//! at a time. Count, address, balance, deposit and rate reads are hard
//! failures that abort the pass. Symbol, price and decimals are soft: a
//! failure is logged and the field falls back, and the pass continues.

use alloy_primitives::Address;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use metamoney_contracts::{Contracts, Erc20, MoneyMarket};
use metamoney_core::{
    annualize_rate, Fetched, FetchError, FetchResult, Market, NetworkId, Snapshot, SymbolSource,
    SymbolTable, TokenAmount, UNKNOWN_SYMBOL,
};
use metamoney_price_feed::PriceLookup;

use crate::session::WalletSession;

/// Reads snapshots of all supported markets
pub struct MarketFetcher {
    prices: Arc<dyn PriceLookup>,
    symbols: Arc<SymbolTable>,
}

impl MarketFetcher {
    pub fn new(prices: Arc<dyn PriceLookup>, symbols: Arc<SymbolTable>) -> Self {
        Self { prices, symbols }
    }

    /// Both bindings, if the session can fetch at all
    pub fn check_ready<'a>(
        session: &WalletSession,
        contracts: Option<&'a Contracts>,
    ) -> FetchResult<(&'a Arc<dyn MoneyMarket>, &'a Arc<dyn Erc20>)> {
        if !session.is_active() {
            return Err(FetchError::NotReady("wallet session is not active"));
        }
        contracts
            .and_then(|c| c.money_market.as_ref().map(|mm| (mm, &c.erc20)))
            .ok_or(FetchError::NotReady("money market is not instantiated"))
    }

    /// Fetch every supported market.
    ///
    /// Balances and deposits are read only when `account` is given.
    pub async fn fetch_snapshot(
        &self,
        session: &WalletSession,
        contracts: Option<&Contracts>,
        account: Option<Address>,
    ) -> FetchResult<Snapshot> {
        let (money_market, erc20) = Self::check_ready(session, contracts)?;

        let start = Instant::now();
        let count = money_market.supported_markets_count().await?;
        let mut markets = Vec::with_capacity(count.min(256) as usize);

        for index in 0..count {
            let address = money_market.supported_markets_list(index).await?;
            let market = self
                .fetch_market(
                    money_market.as_ref(),
                    erc20.as_ref(),
                    session.network_id(),
                    address,
                    account,
                )
                .await?;

            debug!(
                "Market {} {}: rate={}% price={:?}",
                market.symbol, market.address, market.interest_rate, market.price
            );
            markets.push(market);
        }

        info!(
            "Fetched {} markets in {:?} (account: {})",
            markets.len(),
            start.elapsed(),
            account.map(|a| a.to_string()).unwrap_or_else(|| "none".to_string())
        );

        Ok(Snapshot::new(markets, account))
    }

    async fn fetch_market(
        &self,
        money_market: &dyn MoneyMarket,
        erc20: &dyn Erc20,
        network_id: Option<NetworkId>,
        address: Address,
        account: Option<Address>,
    ) -> FetchResult<Market> {
        let (symbol, symbol_source) = self.resolve_symbol(money_market, network_id, address).await;

        let balance = match account {
            Some(account) => Some(erc20.balance_of(address, account).await?),
            None => None,
        };
        let deposited = match account {
            Some(account) => Some(money_market.get_deposited_amount(address, account).await?),
            None => None,
        };

        let rate_per_block = money_market.get_best_interest_rate(address).await?;
        let interest_rate = annualize_rate(rate_per_block);

        let price = self.quote_price(&symbol, address).await;

        let decimals: Fetched<u8> = match erc20.decimals(address).await {
            Ok(d) => Fetched::Available(d),
            Err(e) => {
                warn!("Could not get decimals for token at address {}: {}", address, e);
                Fetched::Unavailable
            }
        };
        let precision = decimals.value_or_default();

        Ok(Market {
            address,
            symbol,
            symbol_source,
            interest_rate,
            price,
            decimals,
            deposit_balance: deposited.map(|raw| TokenAmount::new(raw, precision)),
            wallet_balance: balance.map(|raw| TokenAmount::new(raw, precision)),
        })
    }

    /// On-chain symbol, then the known-symbol table, then the placeholder
    async fn resolve_symbol(
        &self,
        money_market: &dyn MoneyMarket,
        network_id: Option<NetworkId>,
        address: Address,
    ) -> (String, SymbolSource) {
        match money_market.get_market_symbol(address).await {
            Ok(symbol) => (symbol, SymbolSource::OnChain),
            Err(e) => {
                warn!("Could not get symbol for token at address {}: {}", address, e);

                network_id
                    .and_then(|id| self.symbols.get_symbol(id, address))
                    .map(|known| (known.to_string(), SymbolSource::KnownTable))
                    .unwrap_or_else(|| (UNKNOWN_SYMBOL.to_string(), SymbolSource::Unknown))
            }
        }
    }

    async fn quote_price(&self, symbol: &str, address: Address) -> Fetched<f64> {
        if symbol == UNKNOWN_SYMBOL {
            debug!("No symbol for {}, skipping price lookup", address);
            return Fetched::Unavailable;
        }

        match self.prices.get_price(symbol).await {
            Ok(price) => Fetched::Available(price),
            Err(e) => {
                warn!(
                    "Could not get price for token at address {} from {}: {}",
                    address,
                    self.prices.source(),
                    e
                );
                Fetched::Unavailable
            }
        }
    }
}
