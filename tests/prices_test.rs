//! Price oracle fallback and caching behavior.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use baruk_sdk::error::Error;
use baruk_sdk::prices::{PriceOracle, PriceSource};

struct MockSource {
    name: &'static str,
    prices: HashMap<String, f64>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockSource {
    fn new(name: &'static str, pairs: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            name,
            prices: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            prices: HashMap::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }
}

#[async_trait]
impl PriceSource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_prices(&self, addresses: &[String]) -> Result<HashMap<String, f64>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Http("source unavailable".to_string()));
        }
        Ok(addresses
            .iter()
            .filter_map(|a| {
                let key = a.to_lowercase();
                self.prices.get(&key).map(|p| (key, *p))
            })
            .collect())
    }
}

#[tokio::test]
async fn secondary_fills_gaps_left_by_primary() {
    let primary = MockSource::new("primary", &[("0xaaa", 1.5)]);
    let secondary = MockSource::new("secondary", &[("0xaaa", 9.9), ("0xbbb", 2.5)]);
    let oracle = PriceOracle::new(primary.clone(), secondary.clone());

    let prices = oracle
        .get_prices(&["0xAAA".to_string(), "0xBBB".to_string(), "0xCCC".to_string()])
        .await;

    // Primary wins for 0xaaa, secondary fills 0xbbb, 0xccc is absent
    assert_eq!(prices.get("0xaaa"), Some(&1.5));
    assert_eq!(prices.get("0xbbb"), Some(&2.5));
    assert!(!prices.contains_key("0xccc"));
    assert_eq!(prices.len(), 2);
}

#[tokio::test]
async fn secondary_is_not_consulted_when_primary_covers_everything() {
    let primary = MockSource::new("primary", &[("0xaaa", 1.0), ("0xbbb", 2.0)]);
    let secondary = MockSource::new("secondary", &[("0xaaa", 8.0)]);
    let oracle = PriceOracle::new(primary.clone(), secondary.clone());

    let prices = oracle
        .get_prices(&["0xaaa".to_string(), "0xbbb".to_string()])
        .await;

    assert_eq!(prices.len(), 2);
    assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn primary_failure_degrades_to_secondary() {
    let primary = MockSource::failing("primary");
    let secondary = MockSource::new("secondary", &[("0xaaa", 3.25)]);
    let oracle = PriceOracle::new(primary, secondary);

    let prices = oracle.get_prices(&["0xaaa".to_string()]).await;
    assert_eq!(prices.get("0xaaa"), Some(&3.25));
}

#[tokio::test]
async fn both_sources_failing_yields_an_empty_map() {
    let oracle = PriceOracle::new(MockSource::failing("primary"), MockSource::failing("secondary"));
    let prices = oracle.get_prices(&["0xaaa".to_string()]).await;
    assert!(prices.is_empty());
}

#[tokio::test]
async fn fresh_cache_entries_skip_the_sources() {
    let primary = MockSource::new("primary", &[("0xaaa", 1.0)]);
    let secondary = MockSource::new("secondary", &[]);
    let oracle = PriceOracle::new(primary.clone(), secondary.clone());

    let first = oracle.get_prices(&["0xaaa".to_string()]).await;
    let second = oracle.get_prices(&["0xaaa".to_string()]).await;

    assert_eq!(first, second);
    assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_cache_entries_are_refetched() {
    let primary = MockSource::new("primary", &[("0xaaa", 1.0)]);
    let secondary = MockSource::new("secondary", &[]);
    let oracle = PriceOracle::with_ttl(
        primary.clone(),
        secondary.clone(),
        Duration::from_millis(10),
    );

    oracle.get_prices(&["0xaaa".to_string()]).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    oracle.get_prices(&["0xaaa".to_string()]).await;

    assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refresh_refetches_cached_addresses() {
    let primary = MockSource::new("primary", &[("0xaaa", 1.0)]);
    let secondary = MockSource::new("secondary", &[]);
    let oracle = PriceOracle::new(primary.clone(), secondary.clone());

    oracle.get_prices(&["0xaaa".to_string()]).await;
    oracle.refresh().await;

    assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
}
