//! Exchange client abstraction
//!
//! One implementation per venue. Gate.io serves every contract's prices from
//! a single listing endpoint; Phemex has no bulk price endpoint and fans out
//! bounded concurrent single-symbol fetches instead.

mod gate;
mod phemex;

pub use gate::GateClient;
pub use phemex::PhemexClient;

use crate::ticker::Ticker;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use thiserror::Error;

/// A venue's raw inventory entry for one tradeable perpetual contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolListing {
    /// Base asset name common across venues (e.g. "BTC")
    pub base: String,
    /// Venue-native contract symbol (e.g. "BTC_USDT")
    pub symbol: String,
}

/// Exchange client errors
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transport-level failure (connect, timeout, malformed body)
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    /// Non-success HTTP status from the venue
    #[error("{exchange} returned HTTP {status}: {body}")]
    Status {
        exchange: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    /// Payload missing a required field that has no safe default
    #[error("{exchange} payload missing `{field}` for {symbol}")]
    Data {
        exchange: &'static str,
        symbol: String,
        field: &'static str,
    },
}

/// Capability set shared by both venue clients
#[async_trait]
pub trait Exchange: Send + Sync {
    fn name(&self) -> &'static str;

    /// Enumerate every actively tradeable USDT-settled perpetual contract
    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, ExchangeError>;

    /// Fetch price/funding fields for exactly one symbol
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError>;

    /// Fetch every symbol's ticker, keyed by base asset.
    ///
    /// Best-effort: implementations drop individual symbols that fail and
    /// return whatever subset succeeded.
    async fn fetch_all_tickers(&self) -> Result<HashMap<String, Ticker>, ExchangeError>;
}

/// Fan out single-symbol fetches with a bounded number in flight.
///
/// Per-symbol failures are logged and swallowed so one bad symbol never
/// aborts the whole bulk fetch; the result is exactly the successful subset.
pub(crate) async fn bulk_fetch(
    exchange: &dyn Exchange,
    listings: Vec<SymbolListing>,
    workers: usize,
) -> HashMap<String, Ticker> {
    stream::iter(listings)
        .map(|listing| async move {
            match exchange.fetch_ticker(&listing.symbol).await {
                Ok(ticker) => Some((listing.base, ticker)),
                Err(error) => {
                    tracing::debug!(
                        exchange = exchange.name(),
                        symbol = %listing.symbol,
                        %error,
                        "Skipping symbol in bulk fetch"
                    );
                    None
                }
            }
        })
        .buffer_unordered(workers.max(1))
        .filter_map(|item| async move { item })
        .collect()
        .await
}
