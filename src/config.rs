//! Configuration types for perp-gap

use crate::discovery::Pair;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub phemex: PhemexConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Fetch-cycle scheduling and pair-selection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Seconds between fetch cycles
    #[serde(default = "default_fetch_interval_secs")]
    pub fetch_interval_secs: u64,

    /// Auto-discover every perpetual pair common to both exchanges at
    /// startup instead of using the static `pairs` list
    #[serde(default = "default_true")]
    pub discover_all: bool,

    /// Static pair list (used when `discover_all` is false or discovery fails)
    #[serde(default)]
    pub pairs: Vec<Pair>,
}

fn default_fetch_interval_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            fetch_interval_secs: 60,
            discover_all: true,
            pairs: Vec::new(),
        }
    }
}

/// Gate.io client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_gate_base_url")]
    pub base_url: String,

    /// Per-request timeout; must stay well under the cycle interval
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Funding interval assumed when the contract payload omits one
    #[serde(default = "default_funding_interval_hours")]
    pub default_funding_interval_hours: f64,
}

fn default_gate_base_url() -> String {
    "https://api.gateio.ws/api/v4".to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            base_url: default_gate_base_url(),
            request_timeout_secs: 10,
            default_funding_interval_hours: 8.0,
        }
    }
}

/// Phemex client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PhemexConfig {
    #[serde(default = "default_phemex_base_url")]
    pub base_url: String,

    /// Per-request timeout; must stay well under the cycle interval
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Funding interval assumed when /public/products has no entry for a symbol
    #[serde(default = "default_funding_interval_hours")]
    pub default_funding_interval_hours: f64,

    /// Max in-flight requests when bulk-fetching individual tickers
    #[serde(default = "default_bulk_workers")]
    pub bulk_workers: usize,
}

fn default_phemex_base_url() -> String {
    "https://api.phemex.com".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_funding_interval_hours() -> f64 {
    8.0
}
fn default_bulk_workers() -> usize {
    10
}

impl Default for PhemexConfig {
    fn default() -> Self {
        Self {
            base_url: default_phemex_base_url(),
            request_timeout_secs: 10,
            default_funding_interval_hours: 8.0,
            bulk_workers: 10,
        }
    }
}

/// CSV/JSON output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Webhook notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Webhook URL for gap reports; absent or empty disables notifications
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            request_timeout_secs: 10,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Port for the Prometheus scrape endpoint; absent disables the exporter
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
