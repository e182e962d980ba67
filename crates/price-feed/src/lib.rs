//! USD price quotes for market symbols
//!
//! Features:
//! - `PriceLookup` trait the aggregator queries per symbol
//! - Nomics ticker client over reqwest
//! - TTL cache so a refresh loop does not hammer the quote service

pub mod feeds;
pub mod state;

pub use feeds::{parse_ticker, NomicsPriceFeed, PriceLookup};
pub use state::{CachedPriceLookup, PriceCache, PriceCacheStats};
