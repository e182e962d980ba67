//! Market aggregation service

use alloy_primitives::Address;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use metamoney_contracts::Contracts;
use metamoney_core::{FetchError, FetchResult, NetworkId};

use crate::fetcher::MarketFetcher;
use crate::session::WalletSession;
use crate::store::{CommitOutcome, MarketStore, MarketsView};

/// Owns the session, the bindings and the published markets
pub struct MarketAggregator {
    session: RwLock<WalletSession>,
    contracts: RwLock<Option<Contracts>>,
    fetcher: MarketFetcher,
    store: Arc<MarketStore>,
}

impl MarketAggregator {
    pub fn new(session: WalletSession, fetcher: MarketFetcher) -> Self {
        Self {
            session: RwLock::new(session),
            contracts: RwLock::new(None),
            fetcher,
            store: Arc::new(MarketStore::new()),
        }
    }

    pub fn session(&self) -> WalletSession {
        self.session.read().clone()
    }

    pub fn store(&self) -> Arc<MarketStore> {
        Arc::clone(&self.store)
    }

    pub fn subscribe(&self) -> watch::Receiver<MarketsView> {
        self.store.subscribe()
    }

    /// Session is live on `network_id` with `contracts` bound to it
    pub fn connect(&self, network_id: NetworkId, contracts: Contracts) {
        self.session.write().connect(network_id);
        *self.contracts.write() = Some(contracts);
        self.store.reopen();
    }

    /// Tear the session down; fetches still running are dropped on completion
    pub fn disconnect(&self) {
        self.session.write().disconnect();
        *self.contracts.write() = None;
        self.store.close();
    }

    /// Connection attempt failed; nothing is fetched until the next connect
    pub fn fail(&self, reason: impl ToString) {
        self.session.write().fail(reason);
        *self.contracts.write() = None;
        self.store.close();
    }

    pub fn set_account(&self, account: Option<Address>) -> bool {
        self.session.write().set_account(account)
    }

    /// Fetch one snapshot and offer it to the store
    pub async fn refresh(&self, account: Option<Address>) -> FetchResult<CommitOutcome> {
        let session = self.session();
        let contracts = self.contracts.read().clone();

        MarketFetcher::check_ready(&session, contracts.as_ref())?;

        let ticket = self.store.begin_fetch();
        let snapshot = self
            .fetcher
            .fetch_snapshot(&session, contracts.as_ref(), account)
            .await?;
        let outcome = self.store.commit(ticket, snapshot)?;

        match outcome {
            CommitOutcome::Committed { generation, markets } => {
                info!("Published {} markets (generation {})", markets, generation);
            }
            CommitOutcome::Stale { generation, latest } => {
                debug!("Fetch {} superseded by {}", generation, latest);
            }
            CommitOutcome::Closed => {
                debug!("Session closed before fetch finished");
            }
        }
        Ok(outcome)
    }

    /// Refresh with whatever account the session currently holds
    pub async fn refresh_current(&self) -> FetchResult<CommitOutcome> {
        let account = self.session.read().account();
        self.refresh(account).await
    }

    /// Initial load: markets first, then balances once an account is known
    pub async fn start(&self) -> FetchResult<()> {
        self.refresh(None).await?;
        let account = self.session.read().account();
        if let Some(account) = account {
            self.refresh(Some(account)).await?;
        }
        Ok(())
    }

    /// Refresh periodically until `shutdown` fires
    pub async fn run(&self, interval: Duration, mut shutdown: oneshot::Receiver<()>) {
        info!("Starting market refresh every {:?}", interval);

        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.refresh_current().await {
                        Ok(_) => {}
                        Err(FetchError::NotReady(reason)) => {
                            warn!("Skipping refresh: {}", reason);
                        }
                        Err(e) => {
                            error!("Market refresh failed: {}", e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Market refresh shutdown requested");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockChain, MockMarket, MockPrices};
    use metamoney_core::{Connector, SymbolTable};

    fn aggregator(connector: Connector) -> MarketAggregator {
        let prices = MockPrices::new(&[("DAI", 1.0), ("BAT", 0.2)]);
        MarketAggregator::new(
            WalletSession::new(connector),
            MarketFetcher::new(prices, Arc::new(SymbolTable::builtin())),
        )
    }

    #[tokio::test]
    async fn test_refresh_before_connect_is_not_ready() {
        let agg = aggregator(Connector::Infura);
        let result = agg.refresh(None).await;

        assert!(matches!(result, Err(FetchError::NotReady(_))));
        // no ticket was burned
        assert_eq!(agg.store().latest_generation(), 0);
    }

    #[tokio::test]
    async fn test_start_keeps_balances_from_account_fetch() {
        let chain = MockChain::new(vec![MockMarket::new(1, "DAI"), MockMarket::new(2, "BAT")]);
        let agg = aggregator(Connector::MetaMask);
        agg.connect(NetworkId::KOVAN, chain.contracts());
        assert!(agg.set_account(Some(Address::repeat_byte(9))));

        agg.start().await.unwrap();
        let markets = agg.store().markets();
        assert_eq!(markets.len(), 2);
        assert!(markets.iter().all(|m| m.has_balances()));

        // an account-less refresh must not erase balances
        let outcome = agg.refresh(None).await.unwrap();
        assert!(outcome.is_committed());
        assert!(agg.store().markets().iter().all(|m| m.has_balances()));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_published_view() {
        let chain = MockChain::new(vec![MockMarket::new(1, "DAI"), MockMarket::new(2, "BAT")]);
        let agg = aggregator(Connector::Infura);
        agg.connect(NetworkId::MAINNET, chain.contracts());
        agg.refresh(None).await.unwrap();
        let before = agg.store().view();

        chain.fail_on("getBestInterestRate");
        let result = agg.refresh(None).await;

        assert!(matches!(result, Err(FetchError::Contract(_))));
        let after = agg.store().view();
        assert_eq!(after.generation, before.generation);
        assert_eq!(*after.markets, *before.markets);
    }

    #[tokio::test]
    async fn test_disconnect_closes_store() {
        let chain = MockChain::new(vec![MockMarket::new(1, "DAI")]);
        let agg = aggregator(Connector::Infura);
        agg.connect(NetworkId::MAINNET, chain.contracts());
        agg.refresh(None).await.unwrap();

        agg.disconnect();

        assert!(agg.store().is_closed());
        assert!(!agg.session().is_active());
        assert!(matches!(agg.refresh(None).await, Err(FetchError::NotReady(_))));
    }

    #[tokio::test]
    async fn test_failed_connection_records_error() {
        let agg = aggregator(Connector::Infura);
        agg.fail("connection refused");

        assert_eq!(agg.session().error(), Some("connection refused"));
        assert!(matches!(agg.refresh(None).await, Err(FetchError::NotReady(_))));
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let chain = MockChain::new(vec![MockMarket::new(1, "DAI")]);
        let agg = aggregator(Connector::Infura);
        let mut rx = agg.subscribe();
        agg.connect(NetworkId::MAINNET, chain.contracts());

        agg.refresh(None).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().markets.len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let chain = MockChain::new(vec![MockMarket::new(1, "DAI")]);
        let agg = Arc::new(aggregator(Connector::Infura));
        agg.connect(NetworkId::MAINNET, chain.contracts());

        let (tx, rx) = oneshot::channel();
        let runner = {
            let agg = Arc::clone(&agg);
            tokio::spawn(async move { agg.run(Duration::from_millis(10), rx).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();
        runner.await.unwrap();

        assert!(agg.store().view().generation >= 1);
        assert_eq!(agg.store().markets().len(), 1);
    }
}
