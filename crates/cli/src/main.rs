//! MetaMoney command line client
//!
//! `watch` connects to a JSON-RPC node, keeps the money market collection
//! fresh and logs the market table on every published refresh. `deposit`,
//! `withdraw` and `approve` send one transaction from the configured
//! account and exit.

mod commands;
mod report;
mod settings;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use metamoney_aggregator::{MarketAggregator, MarketFetcher, WalletSession};
use metamoney_contracts::{bind, http_provider, network_id, Erc20, HttpProvider};
use metamoney_core::{SymbolTable, TokenAmount};
use metamoney_executor::{RpcTransactionSender, TransactionSubmitter};
use metamoney_price_feed::{CachedPriceLookup, NomicsPriceFeed, PriceCache};

use commands::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting MetaMoney v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = env::args().skip(1).collect();
    let command = commands::parse(&args)?;

    let config_file = env::var(settings::CONFIG_FILE_VAR)
        .unwrap_or_else(|_| settings::DEFAULT_CONFIG_FILE.to_string());
    let config = settings::load(&config_file)?;

    let feed = NomicsPriceFeed::new(&config.prices)?;
    let prices = Arc::new(CachedPriceLookup::new(feed, config.prices.cache_ttl()));
    let price_cache = prices.cache();
    let symbols = Arc::new(SymbolTable::builtin().with_entries(config.symbols.clone()));

    let aggregator = Arc::new(MarketAggregator::new(
        WalletSession::new(config.connector),
        MarketFetcher::new(prices, symbols),
    ));

    let provider = http_provider(&config.network.rpc_url)?;
    let network = match network_id(&provider).await {
        Ok(id) => id,
        Err(e) => {
            aggregator.fail(&e);
            return Err(e.into());
        }
    };
    if let Some(expected) = config.network.network_id {
        if expected != network {
            aggregator.fail(format!("expected {}, provider is on {}", expected, network));
            anyhow::bail!("Provider is on {} but {} is configured", network, expected);
        }
    }

    let contracts = bind(provider.clone(), config.network.money_market);
    let erc20 = Arc::clone(&contracts.erc20);
    aggregator.connect(network, contracts);
    match config.account {
        Some(account) => {
            aggregator.set_account(Some(account));
        }
        None => warn!("Running without an account; balances will not be fetched"),
    }

    match command {
        Command::Watch => {
            watch(&aggregator, price_cache, config.refresh.interval()).await;
        }
        command => {
            let session = aggregator.session();
            submit(command, &session, erc20.as_ref(), provider, config.network.money_market).await?;
        }
    }

    aggregator.disconnect();
    info!("Shutdown complete");
    Ok(())
}

/// Refresh and log markets until Ctrl+C or SIGTERM
async fn watch(aggregator: &Arc<MarketAggregator>, price_cache: Arc<PriceCache>, interval: Duration) {
    // Log every published collection
    let mut updates = aggregator.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            if view.generation > 0 {
                report::log_view(&view);
            }
        }
    });

    // Drop expired quotes between refreshes
    let cleanup_every = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cleanup_every);
        loop {
            ticker.tick().await;
            price_cache.cleanup();
        }
    });

    if let Err(e) = aggregator.start().await {
        error!("Initial market load failed: {}", e);
    }

    // Setup shutdown channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    error!("Failed to install signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C");
            }
            _ = terminate => {
                info!("Received termination signal");
            }
        }

        let _ = shutdown_tx.send(());
    });

    info!("Press Ctrl+C to shutdown");
    aggregator.run(interval, shutdown_rx).await;
}

/// Send one write transaction from the session's account
async fn submit(
    command: Command,
    session: &WalletSession,
    erc20: &dyn Erc20,
    provider: HttpProvider,
    money_market: Address,
) -> anyhow::Result<()> {
    let (token, text) = match &command {
        Command::Deposit { token, amount }
        | Command::Withdraw { token, amount }
        | Command::Approve { token, amount } => (*token, amount.as_str()),
        Command::Watch => return Ok(()),
    };

    let decimals = erc20.decimals(token).await?;
    let amount = TokenAmount::parse(text, decimals)?;
    if amount.is_zero() {
        anyhow::bail!("Amount must be greater than zero");
    }

    let submitter = TransactionSubmitter::new(RpcTransactionSender::new(provider), money_market);
    let submitted = match command {
        Command::Deposit { .. } => submitter.deposit(session, token, amount.raw).await?,
        Command::Withdraw { .. } => submitter.withdraw(session, token, amount.raw).await?,
        _ => submitter.approve(session, token, amount.raw).await?,
    };

    info!(
        "{} of {} sent: {}",
        submitted.action, amount, submitted.tx_hash
    );
    Ok(())
}
