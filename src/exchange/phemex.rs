//! Phemex USDT-settled perpetual futures client
//!
//! Phemex splits the data across two endpoints: funding intervals live in
//! `/public/products` metadata while prices come from per-symbol
//! `/md/v2/ticker/24hr` calls. The interval cache is filled once and reused;
//! the bulk path fans out bounded concurrent single-symbol fetches.

use super::{bulk_fetch, Exchange, ExchangeError, SymbolListing};
use crate::config::PhemexConfig;
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

const EXCHANGE_NAME: &str = "phemex";
const QUOTE_SUFFIX: &str = "USDT";

/// Product metadata entry from `/public/products`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhemexProduct {
    #[serde(default)]
    symbol: String,
    /// Seconds between funding settlements; 0 when absent
    #[serde(default)]
    funding_interval: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductsData {
    #[serde(default)]
    perp_products_v2: Vec<PhemexProduct>,
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    data: Option<ProductsData>,
}

/// Per-symbol ticker payload from `/md/v2/ticker/24hr`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhemexTicker {
    #[serde(default)]
    close_rp: String,
    #[serde(default)]
    mark_price_rp: String,
    #[serde(default)]
    index_price_rp: String,
    #[serde(default)]
    funding_rate_rr: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    error: Option<serde_json::Value>,
    result: Option<PhemexTicker>,
}

pub struct PhemexClient {
    config: PhemexConfig,
    client: Client,
    /// symbol -> funding interval in hours, filled once from /public/products
    interval_cache: RwLock<HashMap<String, f64>>,
}

impl PhemexClient {
    pub fn new(config: PhemexConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            interval_cache: RwLock::new(HashMap::new()),
        }
    }

    async fn fetch_products(&self) -> Result<Vec<PhemexProduct>, ExchangeError> {
        let url = format!("{}/public/products", self.config.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status {
                exchange: EXCHANGE_NAME,
                status,
                body,
            });
        }
        let body: ProductsResponse = response.json().await?;
        Ok(body.data.map(|d| d.perp_products_v2).unwrap_or_default())
    }

    /// Cache funding intervals for every product with a usable value.
    /// Concurrent fillers race benignly: the value is immutable metadata.
    async fn prime_interval_cache(&self, products: &[PhemexProduct]) {
        let mut cache = self.interval_cache.write().await;
        for product in products {
            if !product.symbol.is_empty() && product.funding_interval > 0 {
                cache
                    .entry(product.symbol.clone())
                    .or_insert(product.funding_interval as f64 / 3600.0);
            }
        }
    }

    /// Funding interval in hours for one symbol: cached lookup, one metadata
    /// fetch on miss, configured default when the venue has no entry
    async fn funding_interval_hours(&self, symbol: &str) -> Result<f64, ExchangeError> {
        if let Some(hours) = self.interval_cache.read().await.get(symbol) {
            return Ok(*hours);
        }

        let products = self.fetch_products().await?;
        self.prime_interval_cache(&products).await;

        if let Some(hours) = self.interval_cache.read().await.get(symbol) {
            return Ok(*hours);
        }

        tracing::warn!(
            symbol,
            default_hours = self.config.default_funding_interval_hours,
            "Phemex products has no funding interval for symbol, using default"
        );
        Ok(self.config.default_funding_interval_hours)
    }
}

fn base_asset(symbol: &str) -> Option<&str> {
    symbol
        .strip_suffix(QUOTE_SUFFIX)
        .filter(|base| !base.is_empty())
}

#[async_trait]
impl Exchange for PhemexClient {
    fn name(&self) -> &'static str {
        EXCHANGE_NAME
    }

    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, ExchangeError> {
        let products = self.fetch_products().await?;
        // Cache the funding intervals while we have them
        self.prime_interval_cache(&products).await;

        Ok(products
            .iter()
            .filter_map(|p| {
                base_asset(&p.symbol).map(|base| SymbolListing {
                    base: base.to_string(),
                    symbol: p.symbol.clone(),
                })
            })
            .collect())
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let interval_hours = self.funding_interval_hours(symbol).await?;

        let url = format!("{}/md/v2/ticker/24hr", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status {
                exchange: EXCHANGE_NAME,
                status,
                body,
            });
        }

        let body: TickerResponse = response.json().await?;
        // A non-null `error` member comes back with HTTP 200
        if body.error.is_some() {
            return Err(ExchangeError::Data {
                exchange: EXCHANGE_NAME,
                symbol: symbol.to_string(),
                field: "result",
            });
        }
        let Some(data) = body.result else {
            return Err(ExchangeError::Data {
                exchange: EXCHANGE_NAME,
                symbol: symbol.to_string(),
                field: "result",
            });
        };
        if data.close_rp.is_empty() {
            return Err(ExchangeError::Data {
                exchange: EXCHANGE_NAME,
                symbol: symbol.to_string(),
                field: "closeRp",
            });
        }

        Ok(Ticker {
            exchange: EXCHANGE_NAME.to_string(),
            symbol: symbol.to_string(),
            timestamp: Utc::now(),
            last_price: data.close_rp,
            mark_price: data.mark_price_rp,
            index_price: data.index_price_rp,
            funding_rate: data.funding_rate_rr,
            funding_interval_hours: Some(interval_hours),
        })
    }

    async fn fetch_all_tickers(&self) -> Result<HashMap<String, Ticker>, ExchangeError> {
        // One products call lists the symbols and pre-fills the interval cache
        let listings = self.list_symbols().await?;
        let total = listings.len();

        let tickers = bulk_fetch(self, listings, self.config.bulk_workers).await;
        tracing::info!(
            fetched = tickers.len(),
            total,
            "Phemex: fetched tickers"
        );
        Ok(tickers)
    }
}
