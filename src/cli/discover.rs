//! Discover command implementation

use crate::config::Config;
use crate::discovery::discover_common_pairs;
use crate::exchange::{GateClient, PhemexClient};
use crate::storage::CsvStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Also write the pair snapshot to the data directory
    #[arg(long)]
    pub save: bool,
}

impl DiscoverArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let gate = GateClient::new(config.gate.clone());
        let phemex = PhemexClient::new(config.phemex.clone());

        let pairs = discover_common_pairs(&gate, &phemex).await?;

        if self.save {
            CsvStore::new(config.storage.data_dir.clone()).save_pairs(&pairs)?;
        }

        println!("\nFound {} common pairs:\n", pairs.len());
        for pair in &pairs {
            println!(
                "  {:12} | Gate: {:20} | Phemex: {}",
                pair.name, pair.gate, pair.phemex
            );
        }
        Ok(())
    }
}
