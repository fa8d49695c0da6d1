//! Cycle orchestration and scheduling
//!
//! One cycle fetches both venues, reconciles the common bases, persists the
//! tickers and sends gap reports. Cycles run on a fixed interval, never
//! overlap, and a failure anywhere inside a cycle is logged and absorbed so
//! the next tick proceeds normally.

use crate::config::CollectorConfig;
use crate::discovery::{discover_common_pairs, Pair};
use crate::exchange::Exchange;
use crate::gap::GapReport;
use crate::notify::WebhookNotifier;
use crate::storage::CsvStore;
use crate::telemetry;
use crate::ticker::Ticker;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};

/// How a cycle obtains its tickers
enum FetchStrategy {
    /// Per-pair sequential single-symbol fetches over a fixed list
    Static(Vec<Pair>),
    /// One bulk fetch per venue, intersected by base asset
    Bulk,
}

pub struct Collector {
    gate: Arc<dyn Exchange>,
    phemex: Arc<dyn Exchange>,
    store: CsvStore,
    notifier: WebhookNotifier,
    config: CollectorConfig,
}

impl Collector {
    pub fn new(
        gate: Arc<dyn Exchange>,
        phemex: Arc<dyn Exchange>,
        store: CsvStore,
        notifier: WebhookNotifier,
        config: CollectorConfig,
    ) -> Self {
        Self {
            gate,
            phemex,
            store,
            notifier,
            config,
        }
    }

    /// Run cycles until the optional duration cap elapses or the process is
    /// interrupted. The first cycle starts immediately.
    pub async fn run(&self, duration_cap: Option<Duration>) -> anyhow::Result<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received. Stopping.");
            }
            _ = self.run_loop(duration_cap) => {
                tracing::info!("Duration limit reached. Stopping.");
            }
        }
        Ok(())
    }

    /// The scheduler proper: non-reentrant fixed-interval ticks with an
    /// optional deadline. Split from `run` so tests can drive it without
    /// signal handling.
    async fn run_loop(&self, duration_cap: Option<Duration>) {
        let strategy = self.resolve_strategy().await;
        let deadline = duration_cap
            .filter(|cap| !cap.is_zero())
            .map(|cap| Instant::now() + cap);

        let mut tick = interval(Duration::from_secs(self.config.fetch_interval_secs.max(1)));
        // A cycle that overruns delays the next tick instead of bursting
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if let Some(deadline) = deadline {
                tokio::select! {
                    _ = sleep_until(deadline) => return,
                    _ = tick.tick() => {}
                }
            } else {
                tick.tick().await;
            }

            if let Err(error) = self.run_cycle(&strategy).await {
                telemetry::record_cycle_error();
                tracing::error!(%error, "Cycle failed; continuing on next tick");
            }
        }
    }

    /// Decide the fetch strategy once at startup. Discovery failure falls
    /// back to the configured static pair list.
    async fn resolve_strategy(&self) -> FetchStrategy {
        if !self.config.discover_all {
            return FetchStrategy::Static(self.config.pairs.clone());
        }

        match discover_common_pairs(self.gate.as_ref(), self.phemex.as_ref()).await {
            Ok(pairs) => {
                telemetry::set_common_pairs(pairs.len());
                if let Err(error) = self.store.save_pairs(&pairs) {
                    tracing::warn!(%error, "Failed to write pair snapshot");
                }
                FetchStrategy::Bulk
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    fallback_pairs = self.config.pairs.len(),
                    "Pair discovery failed; falling back to static pair list"
                );
                FetchStrategy::Static(self.config.pairs.clone())
            }
        }
    }

    async fn run_cycle(&self, strategy: &FetchStrategy) -> anyhow::Result<()> {
        telemetry::record_cycle();
        match strategy {
            FetchStrategy::Static(pairs) => self.run_static_cycle(pairs).await,
            FetchStrategy::Bulk => self.run_bulk_cycle().await,
        }
        Ok(())
    }

    /// Per pair, fetch each venue in turn. A failure on one venue only
    /// omits that venue from the pair's gap comparison.
    async fn run_static_cycle(&self, pairs: &[Pair]) {
        for pair in pairs {
            let gate = self
                .fetch_and_store(self.gate.as_ref(), &pair.gate, &pair.name)
                .await;
            let phemex = self
                .fetch_and_store(self.phemex.as_ref(), &pair.phemex, &pair.name)
                .await;

            if let (Some(gate), Some(phemex)) = (gate, phemex) {
                self.report_gap(&pair.name, &gate, &phemex).await;
            }
        }
    }

    /// Bulk-fetch both venues concurrently, then reconcile. A venue-level
    /// failure empties that venue's side but the other venue's data is
    /// still persisted in full.
    async fn run_bulk_cycle(&self) {
        let (gate_result, phemex_result) = tokio::join!(
            self.gate.fetch_all_tickers(),
            self.phemex.fetch_all_tickers()
        );

        let gate = self.unwrap_bulk(self.gate.name(), gate_result);
        let phemex = self.unwrap_bulk(self.phemex.name(), phemex_result);

        let mut bases: Vec<&String> = match (&gate, &phemex) {
            // Reports only make sense for bases present on both venues
            (Some(g), Some(p)) => g.keys().filter(|base| p.contains_key(*base)).collect(),
            (Some(g), None) => g.keys().collect(),
            (None, Some(p)) => p.keys().collect(),
            (None, None) => Vec::new(),
        };
        bases.sort_unstable();

        for base in bases {
            let gate_ticker = gate.as_ref().and_then(|m| m.get(base));
            let phemex_ticker = phemex.as_ref().and_then(|m| m.get(base));

            for ticker in [gate_ticker, phemex_ticker].into_iter().flatten() {
                self.store_ticker(ticker, base);
            }

            if let (Some(gate_ticker), Some(phemex_ticker)) = (gate_ticker, phemex_ticker) {
                self.report_gap(base, gate_ticker, phemex_ticker).await;
            }
        }
    }

    fn unwrap_bulk(
        &self,
        exchange: &'static str,
        result: Result<HashMap<String, Ticker>, crate::exchange::ExchangeError>,
    ) -> Option<HashMap<String, Ticker>> {
        match result {
            Ok(tickers) => Some(tickers),
            Err(error) => {
                tracing::error!(exchange, %error, "Bulk fetch failed; venue absent this cycle");
                None
            }
        }
    }

    /// Single-symbol fetch + persist; `None` on failure or unconfigured symbol
    async fn fetch_and_store(
        &self,
        exchange: &dyn Exchange,
        symbol: &str,
        pair_name: &str,
    ) -> Option<Ticker> {
        if symbol.is_empty() {
            return None;
        }

        match exchange.fetch_ticker(symbol).await {
            Ok(ticker) => {
                self.store_ticker(&ticker, pair_name);
                Some(ticker)
            }
            Err(error) => {
                tracing::warn!(
                    exchange = exchange.name(),
                    pair = pair_name,
                    symbol,
                    %error,
                    "Fetch failed"
                );
                None
            }
        }
    }

    fn store_ticker(&self, ticker: &Ticker, pair_name: &str) {
        tracing::info!(
            exchange = %ticker.exchange,
            symbol = %ticker.symbol,
            last = %ticker.last_price,
            mark = %ticker.mark_price,
            index = %ticker.index_price,
            funding_rate = %ticker.funding_rate,
            interval_h = ?ticker.funding_interval_hours,
            funding_rate_8h = ticker.funding_rate_8h(),
            "Ticker"
        );
        telemetry::record_ticker_stored(&ticker.exchange);
        if let Err(error) = self.store.save_ticker(ticker, pair_name) {
            tracing::warn!(pair = pair_name, %error, "Failed to persist ticker");
        }
    }

    async fn report_gap(&self, pair_name: &str, gate: &Ticker, phemex: &Ticker) {
        let report = GapReport::build(pair_name, gate, phemex);
        let message = report.message();
        tracing::info!(pair = pair_name, "Gap report:\n{message}");
        telemetry::record_gap_report();
        self.notifier.send(&message).await;
    }
}
