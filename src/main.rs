use clap::Parser;
use perp_gap::cli::{Cli, Commands};
use perp_gap::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = perp_gap::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(&config).await?;
        }
        Commands::Discover(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Collector: every {}s, discovery={}",
                config.collector.fetch_interval_secs, config.collector.discover_all
            );
            println!("  Static pairs: {}", config.collector.pairs.len());
            println!("  Gate: {}", config.gate.base_url);
            println!(
                "  Phemex: {} ({} bulk workers)",
                config.phemex.base_url, config.phemex.bulk_workers
            );
            println!("  Data dir: {}", config.storage.data_dir.display());
            println!(
                "  Webhook: {}",
                if config
                    .notify
                    .webhook_url
                    .as_deref()
                    .is_some_and(|url| !url.is_empty())
                {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
    }

    Ok(())
}
