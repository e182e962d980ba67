//! Price quote sources

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use metamoney_core::{PriceConfig, PriceFeedError, PriceFeedResult};

/// Keyed lookup from a token symbol to its current USD price
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn get_price(&self, symbol: &str) -> PriceFeedResult<f64>;

    /// Name for logs
    fn source(&self) -> &'static str;
}

/// One entry of the ticker response
#[derive(Debug, Deserialize)]
struct TickerEntry {
    id: String,
    price: String,
}

/// Nomics currencies ticker client
pub struct NomicsPriceFeed {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NomicsPriceFeed {
    pub fn new(config: &PriceConfig) -> PriceFeedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PriceFeedError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn ticker_url(&self) -> String {
        format!("{}/currencies/ticker", self.base_url)
    }
}

#[async_trait]
impl PriceLookup for NomicsPriceFeed {
    async fn get_price(&self, symbol: &str) -> PriceFeedResult<f64> {
        let mut query: Vec<(&str, &str)> = vec![("ids", symbol), ("convert", "USD")];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = self
            .client
            .get(self.ticker_url())
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PriceFeedError::Timeout
                } else {
                    PriceFeedError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Price service rate limited the request for {}", symbol);
            return Err(PriceFeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(PriceFeedError::Request(format!("HTTP {} for {}", status, symbol)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PriceFeedError::Request(e.to_string()))?;

        let price = parse_ticker(symbol, &body)?;
        debug!("Quoted {} at ${}", symbol, price);
        Ok(price)
    }

    fn source(&self) -> &'static str {
        "nomics"
    }
}

/// Extract the quote for `symbol` from a ticker response body
pub fn parse_ticker(symbol: &str, body: &str) -> PriceFeedResult<f64> {
    let entries: Vec<TickerEntry> =
        serde_json::from_str(body).map_err(|e| PriceFeedError::InvalidMessage(e.to_string()))?;

    let entry = entries
        .iter()
        .find(|e| e.id.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| PriceFeedError::NotFound(symbol.to_string()))?;

    let price: f64 = entry
        .price
        .parse()
        .map_err(|_| PriceFeedError::InvalidMessage(format!("price {:?} is not a number", entry.price)))?;

    if !price.is_finite() || price < 0.0 {
        return Err(PriceFeedError::InvalidMessage(format!("price {} out of range", price)));
    }
    Ok(price)
}
