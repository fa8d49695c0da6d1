//! CLI interface for perp-gap
//!
//! Provides subcommands for:
//! - `run`: Start the collector loop
//! - `discover`: List pairs common to both exchanges
//! - `config`: Show effective configuration

mod discover;
mod run;

pub use discover::DiscoverArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "perp-gap")]
#[command(about = "Cross-exchange perpetual futures gap monitor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the collector loop
    Run(RunArgs),
    /// List perpetual pairs common to both exchanges
    Discover(DiscoverArgs),
    /// Show effective configuration
    Config,
}
