//! Token price oracle.
//!
//! Proxies two external pricing APIs with fallback: the primary source wins,
//! addresses it cannot price fall back to the secondary, and addresses priced
//! by neither are absent from the result. Source failures degrade to "no
//! prices from that source" rather than failing the lookup. Results are
//! cached briefly to match the UI's 30 second price refresh cadence.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::Error;

/// Default cache TTL, matching the front-end price poll interval
pub const PRICE_CACHE_TTL: Duration = Duration::from_secs(30);

/// Simple token bucket rate limiter for external API calls
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: Arc<Mutex<f64>>,
    rate: f64,
    capacity: f64,
    last_update: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(rate: f64, capacity: f64) -> Self {
        Self {
            tokens: Arc::new(Mutex::new(capacity)),
            rate,
            capacity,
            last_update: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub async fn acquire(&self) {
        loop {
            let mut tokens = self.tokens.lock().await;
            let mut last_update = self.last_update.lock().await;

            let now = Instant::now();
            let elapsed = now.duration_since(*last_update).as_secs_f64();
            *tokens = (*tokens + elapsed * self.rate).min(self.capacity);
            *last_update = now;

            if *tokens >= 1.0 {
                *tokens -= 1.0;
                return;
            }

            let wait = ((1.0 - *tokens) / self.rate).max(0.0);
            drop(tokens);
            drop(last_update);
            tokio::time::sleep(Duration::from_secs_f64(wait)).await;
        }
    }
}

/// A token price source keyed by contract address
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// USD prices for the given addresses. Addresses the source cannot price
    /// are simply absent from the map.
    async fn fetch_prices(&self, addresses: &[String]) -> Result<HashMap<String, f64>, Error>;
}

/// GeckoTerminal-style per-network token price endpoint
pub struct GeckoTerminalSource {
    client: reqwest::Client,
    base_url: String,
    network: String,
    rate_limiter: RateLimiter,
}

#[derive(Debug, Deserialize)]
struct GeckoTerminalResponse {
    data: GeckoTerminalData,
}

#[derive(Debug, Deserialize)]
struct GeckoTerminalData {
    attributes: GeckoTerminalAttributes,
}

#[derive(Debug, Deserialize)]
struct GeckoTerminalAttributes {
    token_prices: HashMap<String, String>,
}

impl GeckoTerminalSource {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: "https://api.geckoterminal.com/api/v2".to_string(),
            network: network.into(),
            // Public tier allows ~30 calls/min
            rate_limiter: RateLimiter::new(0.5, 5.0),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PriceSource for GeckoTerminalSource {
    fn name(&self) -> &'static str {
        "geckoterminal"
    }

    async fn fetch_prices(&self, addresses: &[String]) -> Result<HashMap<String, f64>, Error> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }
        self.rate_limiter.acquire().await;

        let url = format!(
            "{}/simple/networks/{}/token_price/{}",
            self.base_url,
            self.network,
            addresses.join(",")
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "{} returned status {}",
                self.name(),
                response.status()
            )));
        }

        let body: GeckoTerminalResponse = response.json().await?;
        let mut prices = HashMap::new();
        for (address, price) in body.data.attributes.token_prices {
            match price.parse::<f64>() {
                Ok(value) => {
                    prices.insert(address.to_lowercase(), value);
                }
                Err(_) => warn!(address, price, "Unparseable price from geckoterminal"),
            }
        }
        Ok(prices)
    }
}

/// CoinGecko-style platform token price endpoint
pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
    platform: String,
    rate_limiter: RateLimiter,
}

impl CoinGeckoSource {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            platform: platform.into(),
            // Free tier: stay well under 30 calls/min
            rate_limiter: RateLimiter::new(0.2, 5.0),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch_prices(&self, addresses: &[String]) -> Result<HashMap<String, f64>, Error> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }
        self.rate_limiter.acquire().await;

        let url = format!(
            "{}/simple/token_price/{}?contract_addresses={}&vs_currencies=usd",
            self.base_url,
            self.platform,
            addresses.join(",")
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "{} returned status {}",
                self.name(),
                response.status()
            )));
        }

        let body: HashMap<String, HashMap<String, f64>> = response.json().await?;
        let mut prices = HashMap::new();
        for (address, currencies) in body {
            if let Some(usd) = currencies.get("usd") {
                prices.insert(address.to_lowercase(), *usd);
            }
        }
        Ok(prices)
    }
}

/// Merge primary and secondary results for the requested addresses.
///
/// Primary wins; the secondary fills addresses the primary missed; addresses
/// priced by neither are absent from the result.
pub fn merge_prices(
    primary: &HashMap<String, f64>,
    secondary: &HashMap<String, f64>,
    addresses: &[String],
) -> HashMap<String, f64> {
    let mut merged = HashMap::new();
    for address in addresses {
        let key = address.to_lowercase();
        if let Some(price) = primary.get(&key).or_else(|| secondary.get(&key)) {
            merged.insert(key, *price);
        }
    }
    merged
}

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: Instant,
}

/// Price oracle with primary/secondary fallback and a short TTL cache
pub struct PriceOracle {
    primary: Arc<dyn PriceSource>,
    secondary: Arc<dyn PriceSource>,
    cache: RwLock<HashMap<String, CachedPrice>>,
    ttl: Duration,
}

impl PriceOracle {
    pub fn new(primary: Arc<dyn PriceSource>, secondary: Arc<dyn PriceSource>) -> Self {
        Self::with_ttl(primary, secondary, PRICE_CACHE_TTL)
    }

    pub fn with_ttl(
        primary: Arc<dyn PriceSource>,
        secondary: Arc<dyn PriceSource>,
        ttl: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Default oracle for a Sei network
    pub fn for_sei() -> Self {
        Self::new(
            Arc::new(GeckoTerminalSource::new("sei-evm")),
            Arc::new(CoinGeckoSource::new("sei-network")),
        )
    }

    /// USD prices for the given addresses. Addresses with no price from
    /// either source are absent from the result map.
    pub async fn get_prices(&self, addresses: &[String]) -> HashMap<String, f64> {
        let normalized: Vec<String> = addresses.iter().map(|a| a.to_lowercase()).collect();

        let mut result = HashMap::new();
        let mut missing = Vec::new();
        {
            let cache = self.cache.read().await;
            for address in &normalized {
                match cache.get(address) {
                    Some(cached) if cached.fetched_at.elapsed() < self.ttl => {
                        result.insert(address.clone(), cached.price);
                    }
                    _ => missing.push(address.clone()),
                }
            }
        }

        if missing.is_empty() {
            return result;
        }

        let fetched = self.fetch_merged(&missing).await;
        {
            let mut cache = self.cache.write().await;
            let now = Instant::now();
            for (address, price) in &fetched {
                cache.insert(
                    address.clone(),
                    CachedPrice {
                        price: *price,
                        fetched_at: now,
                    },
                );
            }
        }
        result.extend(fetched);
        result
    }

    /// Re-fetch every cached address, refreshing the cache in place.
    /// Driven by the server's 30s polling task.
    pub async fn refresh(&self) {
        let addresses: Vec<String> = {
            let cache = self.cache.read().await;
            cache.keys().cloned().collect()
        };
        if addresses.is_empty() {
            return;
        }
        debug!(count = addresses.len(), "Refreshing cached prices");

        let fetched = self.fetch_merged(&addresses).await;
        let mut cache = self.cache.write().await;
        let now = Instant::now();
        for (address, price) in fetched {
            cache.insert(
                address,
                CachedPrice {
                    price,
                    fetched_at: now,
                },
            );
        }
    }

    async fn fetch_merged(&self, addresses: &[String]) -> HashMap<String, f64> {
        let primary = match self.primary.fetch_prices(addresses).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(source = self.primary.name(), error = %e, "Primary price source failed");
                HashMap::new()
            }
        };

        // Only consult the secondary for what the primary could not price
        let unpriced: Vec<String> = addresses
            .iter()
            .filter(|a| !primary.contains_key(&a.to_lowercase()))
            .cloned()
            .collect();

        let secondary = if unpriced.is_empty() {
            HashMap::new()
        } else {
            match self.secondary.fetch_prices(&unpriced).await {
                Ok(prices) => prices,
                Err(e) => {
                    warn!(source = self.secondary.name(), error = %e, "Secondary price source failed");
                    HashMap::new()
                }
            }
        };

        merge_prices(&primary, &secondary, addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn primary_wins_over_secondary() {
        let primary = map(&[("0xaaa", 1.0)]);
        let secondary = map(&[("0xaaa", 2.0), ("0xbbb", 3.0)]);
        let addresses = vec!["0xAAA".to_string(), "0xBBB".to_string()];

        let merged = merge_prices(&primary, &secondary, &addresses);
        assert_eq!(merged.get("0xaaa"), Some(&1.0));
        assert_eq!(merged.get("0xbbb"), Some(&3.0));
    }

    #[test]
    fn unpriced_addresses_are_absent() {
        let primary = map(&[("0xaaa", 1.0)]);
        let secondary = HashMap::new();
        let addresses = vec!["0xaaa".to_string(), "0xccc".to_string()];

        let merged = merge_prices(&primary, &secondary, &addresses);
        assert_eq!(merged.len(), 1);
        assert!(!merged.contains_key("0xccc"));
    }

    #[test]
    fn merge_only_returns_requested_addresses() {
        let primary = map(&[("0xaaa", 1.0), ("0xddd", 9.0)]);
        let secondary = HashMap::new();
        let addresses = vec!["0xaaa".to_string()];

        let merged = merge_prices(&primary, &secondary, &addresses);
        assert_eq!(merged.len(), 1);
    }
}
