//! Run command implementation

use crate::collector::Collector;
use crate::config::Config;
use crate::exchange::{Exchange, GateClient, PhemexClient};
use crate::notify::WebhookNotifier;
use crate::storage::CsvStore;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Max run duration in seconds (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub duration: u64,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let gate: Arc<dyn Exchange> = Arc::new(GateClient::new(config.gate.clone()));
        let phemex: Arc<dyn Exchange> = Arc::new(PhemexClient::new(config.phemex.clone()));
        let store = CsvStore::new(config.storage.data_dir.clone());
        let notifier = WebhookNotifier::new(&config.notify);

        tracing::info!(
            interval_secs = config.collector.fetch_interval_secs,
            discover_all = config.collector.discover_all,
            static_pairs = config.collector.pairs.len(),
            duration_secs = self.duration,
            notifications = notifier.is_enabled(),
            "Starting perpetual futures data collector"
        );

        let duration_cap = (self.duration > 0).then(|| Duration::from_secs(self.duration));
        let collector = Collector::new(gate, phemex, store, notifier, config.collector.clone());
        collector.run(duration_cap).await
    }
}
