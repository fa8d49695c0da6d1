//! Ticker snapshot model and funding-rate normalization
//!
//! Prices and funding rates are kept as the decimal strings the exchanges
//! emit; parsing to float happens only at the point of comparison so the
//! persisted values never suffer a float round-trip.

use chrono::{DateTime, Utc};

/// Settlement cadence everything is rescaled to, in hours
pub const NORMALIZATION_BASIS_HOURS: f64 = 8.0;

/// Immutable snapshot of one venue/symbol at one point in time
#[derive(Debug, Clone)]
pub struct Ticker {
    pub exchange: String,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub last_price: String,
    pub mark_price: String,
    pub index_price: String,
    pub funding_rate: String,
    /// Hours between funding settlements; `None` when the venue did not
    /// report one (distinct from zero, which is never stored)
    pub funding_interval_hours: Option<f64>,
}

impl Ticker {
    /// Funding rate rescaled to an 8-hour settlement cadence
    pub fn funding_rate_8h(&self) -> f64 {
        normalize(&self.funding_rate, self.funding_interval_hours)
    }

    pub fn csv_header() -> &'static str {
        "timestamp,exchange,symbol,last_price,mark_price,index_price,funding_rate,funding_interval_h,funding_rate_8h"
    }

    pub fn to_csv_row(&self) -> String {
        let interval = self
            .funding_interval_hours
            .map(|h| h.to_string())
            .unwrap_or_default();
        format!(
            "{},{},{},{},{},{},{},{},{:.8}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%z"),
            self.exchange,
            self.symbol,
            self.last_price,
            self.mark_price,
            self.index_price,
            self.funding_rate,
            interval,
            self.funding_rate_8h(),
        )
    }
}

/// Rescale a venue-native funding rate to the 8-hour basis.
///
/// Returns 0.0 when the rate string does not parse or the interval is
/// unknown or non-positive. A degraded reading folds into the gap math as
/// "no funding edge" instead of aborting the cycle.
pub fn normalize(raw_rate: &str, interval_hours: Option<f64>) -> f64 {
    let Ok(rate) = raw_rate.trim().parse::<f64>() else {
        return 0.0;
    };
    match interval_hours {
        Some(hours) if hours > 0.0 => rate * NORMALIZATION_BASIS_HOURS / hours,
        _ => 0.0,
    }
}
