//! Market aggregation for the MetaMoney client
//!
//! Features:
//! - Explicit wallet session state
//! - Fault-tolerant snapshot fetch over contract bindings
//! - Address-keyed merge into one published collection
//! - Generation counter so stale fetches never overwrite fresh ones

pub mod fetcher;
pub mod service;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use fetcher::MarketFetcher;
pub use service::MarketAggregator;
pub use session::WalletSession;
pub use store::{CommitOutcome, FetchTicket, MarketStore, MarketsView};
