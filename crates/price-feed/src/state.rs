//! Price cache
//!
//! Uses DashMap for concurrent reads/writes with minimal contention.
//! Only successful quotes are cached; a failed lookup is retried on the
//! next fetch.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use metamoney_core::PriceFeedResult;

use crate::feeds::PriceLookup;

/// Timestamped price entry
#[derive(Debug, Clone, Copy)]
pub struct PriceEntry {
    pub price: f64,
    pub updated_at: Instant,
}

impl PriceEntry {
    pub fn age(&self) -> Duration {
        self.updated_at.elapsed()
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}

/// Symbol-keyed price cache with a fixed time to live
#[derive(Debug)]
pub struct PriceCache {
    /// Prices indexed by upper-cased symbol
    prices: DashMap<String, PriceEntry>,
    ttl: Duration,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            prices: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn key(symbol: &str) -> String {
        symbol.to_ascii_uppercase()
    }

    /// Fresh price for `symbol`, if any
    pub fn get(&self, symbol: &str) -> Option<f64> {
        let fresh = self
            .prices
            .get(&Self::key(symbol))
            .filter(|e| !e.value().is_stale(self.ttl))
            .map(|e| e.value().price);

        match fresh {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        fresh
    }

    pub fn insert(&self, symbol: &str, price: f64) {
        self.prices.insert(
            Self::key(symbol),
            PriceEntry {
                price,
                updated_at: Instant::now(),
            },
        );
    }

    /// Drop stale entries
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.prices.retain(|_, v| !v.is_stale(ttl));
    }

    pub fn stats(&self) -> PriceCacheStats {
        PriceCacheStats {
            entries: self.prices.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Statistics about the price cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Wraps a lookup with a [`PriceCache`]
pub struct CachedPriceLookup<L> {
    inner: L,
    cache: Arc<PriceCache>,
}

impl<L: PriceLookup> CachedPriceLookup<L> {
    pub fn new(inner: L, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(PriceCache::new(ttl)),
        }
    }

    pub fn cache(&self) -> Arc<PriceCache> {
        Arc::clone(&self.cache)
    }
}

#[async_trait]
impl<L: PriceLookup> PriceLookup for CachedPriceLookup<L> {
    async fn get_price(&self, symbol: &str) -> PriceFeedResult<f64> {
        if let Some(price) = self.cache.get(symbol) {
            debug!("Cached price for {}: {}", symbol, price);
            return Ok(price);
        }

        let price = self.inner.get_price(symbol).await?;
        self.cache.insert(symbol, price);
        Ok(price)
    }

    fn source(&self) -> &'static str {
        self.inner.source()
    }
}
