//! perp-gap: cross-exchange perpetual futures gap monitor
//!
//! This library provides the core components for:
//! - Exchange clients for Gate.io and Phemex USDT perpetuals
//! - Discovery of pairs listed on both venues
//! - Funding-rate normalization onto a common 8-hour basis
//! - Cross-venue price/funding gap reports
//! - A fixed-interval collector loop with partial-failure tolerance
//! - CSV persistence and webhook notifications
//! - Full observability stack

pub mod cli;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod exchange;
pub mod gap;
pub mod notify;
pub mod storage;
pub mod telemetry;
pub mod ticker;
