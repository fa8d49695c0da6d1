//! Gate.io USDT-margined perpetual futures client
//!
//! A single `/futures/usdt/contracts` listing already carries every
//! contract's prices and funding fields, so the bulk path is one request.

use super::{Exchange, ExchangeError, SymbolListing};
use crate::config::GateConfig;
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const EXCHANGE_NAME: &str = "gate";
const QUOTE_SUFFIX: &str = "_USDT";

/// Contract payload from `/futures/usdt/contracts`
#[derive(Debug, Deserialize)]
struct GateContract {
    #[serde(default)]
    name: String,
    #[serde(default)]
    last_price: String,
    #[serde(default)]
    mark_price: String,
    #[serde(default)]
    index_price: String,
    #[serde(default)]
    funding_rate: String,
    /// Seconds between funding settlements; 0 when absent
    #[serde(default)]
    funding_interval: i64,
}

pub struct GateClient {
    config: GateConfig,
    client: Client,
}

impl GateClient {
    pub fn new(config: GateConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ExchangeError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status {
                exchange: EXCHANGE_NAME,
                status,
                body,
            });
        }
        Ok(response.json().await?)
    }

    async fn fetch_contracts(&self) -> Result<Vec<GateContract>, ExchangeError> {
        let url = format!("{}/futures/usdt/contracts", self.config.base_url);
        self.get_json(&url).await
    }

    /// Funding interval in hours, falling back to the configured default
    /// when the payload carries no usable value
    fn interval_hours(&self, symbol: &str, interval_secs: i64) -> f64 {
        if interval_secs > 0 {
            return interval_secs as f64 / 3600.0;
        }
        tracing::warn!(
            symbol,
            default_hours = self.config.default_funding_interval_hours,
            "Gate contract missing funding_interval, using default"
        );
        self.config.default_funding_interval_hours
    }

    fn to_ticker(&self, contract: &GateContract, now: DateTime<Utc>) -> Ticker {
        Ticker {
            exchange: EXCHANGE_NAME.to_string(),
            symbol: contract.name.clone(),
            timestamp: now,
            last_price: contract.last_price.clone(),
            mark_price: contract.mark_price.clone(),
            index_price: contract.index_price.clone(),
            funding_rate: contract.funding_rate.clone(),
            funding_interval_hours: Some(self.interval_hours(&contract.name, contract.funding_interval)),
        }
    }
}

/// Base asset for a USDT-settled contract name, `None` for anything else
fn base_asset(name: &str) -> Option<&str> {
    name.strip_suffix(QUOTE_SUFFIX).filter(|base| !base.is_empty())
}

/// Keep only contracts usable for a bulk price snapshot: USDT-settled, with
/// a known funding interval and a non-zero last price
fn bulk_eligible(contract: &GateContract) -> bool {
    base_asset(&contract.name).is_some()
        && contract.funding_interval > 0
        && !contract.last_price.is_empty()
        && contract.last_price != "0"
}

#[async_trait]
impl Exchange for GateClient {
    fn name(&self) -> &'static str {
        EXCHANGE_NAME
    }

    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, ExchangeError> {
        let contracts = self.fetch_contracts().await?;
        Ok(contracts
            .iter()
            .filter_map(|c| {
                base_asset(&c.name).map(|base| SymbolListing {
                    base: base.to_string(),
                    symbol: c.name.clone(),
                })
            })
            .collect())
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let url = format!("{}/futures/usdt/contracts/{}", self.config.base_url, symbol);
        let contract: GateContract = self.get_json(&url).await?;

        if contract.last_price.is_empty() {
            return Err(ExchangeError::Data {
                exchange: EXCHANGE_NAME,
                symbol: symbol.to_string(),
                field: "last_price",
            });
        }

        Ok(self.to_ticker(&contract, Utc::now()))
    }

    async fn fetch_all_tickers(&self) -> Result<HashMap<String, Ticker>, ExchangeError> {
        let contracts = self.fetch_contracts().await?;
        let now = Utc::now();

        let tickers: HashMap<String, Ticker> = contracts
            .iter()
            .filter(|c| bulk_eligible(c))
            .map(|c| {
                let base = base_asset(&c.name).unwrap_or_default().to_string();
                (base, self.to_ticker(c, now))
            })
            .collect();

        tracing::info!(count = tickers.len(), "Gate: fetched USDT-M contracts");
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GateClient {
        GateClient::new(GateConfig::default())
    }

    fn contract(name: &str, last: &str, interval_secs: i64) -> GateContract {
        GateContract {
            name: name.to_string(),
            last_price: last.to_string(),
            mark_price: "100.1".to_string(),
            index_price: "100.2".to_string(),
            funding_rate: "0.0001".to_string(),
            funding_interval: interval_secs,
        }
    }

    #[test]
    fn test_contract_deserialize() {
        let json = r#"{
            "name": "BTC_USDT",
            "last_price": "42500.1",
            "mark_price": "42500.2",
            "index_price": "42500.3",
            "funding_rate": "0.000058",
            "funding_interval": 28800,
            "in_delisting": false
        }"#;

        let contract: GateContract = serde_json::from_str(json).unwrap();
        assert_eq!(contract.name, "BTC_USDT");
        assert_eq!(contract.last_price, "42500.1");
        assert_eq!(contract.funding_rate, "0.000058");
        assert_eq!(contract.funding_interval, 28800);
    }

    #[test]
    fn test_contract_deserialize_missing_fields() {
        let contract: GateContract = serde_json::from_str(r#"{"name": "BTC_USDT"}"#).unwrap();
        assert!(contract.last_price.is_empty());
        assert_eq!(contract.funding_interval, 0);
    }

    #[test]
    fn test_base_asset() {
        assert_eq!(base_asset("BTC_USDT"), Some("BTC"));
        assert_eq!(base_asset("RIVER_USDT"), Some("RIVER"));
        assert_eq!(base_asset("BTC_USD"), None);
        assert_eq!(base_asset("_USDT"), None);
    }

    #[test]
    fn test_to_ticker_interval_from_seconds() {
        let c = contract("BTC_USDT", "42500.1", 14400);
        let ticker = client().to_ticker(&c, Utc::now());
        assert_eq!(ticker.exchange, "gate");
        assert_eq!(ticker.funding_interval_hours, Some(4.0));
        assert_eq!(ticker.last_price, "42500.1");
    }

    #[test]
    fn test_to_ticker_interval_fallback() {
        let c = contract("BTC_USDT", "42500.1", 0);
        let ticker = client().to_ticker(&c, Utc::now());
        assert_eq!(ticker.funding_interval_hours, Some(8.0));
    }

    #[test]
    fn test_bulk_eligible_filters() {
        assert!(bulk_eligible(&contract("BTC_USDT", "42500.1", 28800)));
        // wrong quote asset
        assert!(!bulk_eligible(&contract("BTC_USD", "42500.1", 28800)));
        // unknown funding interval
        assert!(!bulk_eligible(&contract("BTC_USDT", "42500.1", 0)));
        // empty or zero last price
        assert!(!bulk_eligible(&contract("BTC_USDT", "", 28800)));
        assert!(!bulk_eligible(&contract("BTC_USDT", "0", 28800)));
    }
}
