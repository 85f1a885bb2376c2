//! CLI argument parsing using clap.
//!
//! Defines the command-line interface for the stable-channel daemon:
//! the monitor itself and a one-shot rate query.

mod config;

pub use config::{ConfigError, MonitorConfig};

use clap::{Parser, Subcommand};

/// StableChannels - USD-pegged Lightning channel monitor
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the stability monitor for one channel agreement
    Run {
        /// Identifier of the channel to stabilize
        #[arg(long)]
        channel_id: String,
        /// Node identity of the counterparty
        #[arg(long)]
        counterparty: String,
        /// Dollar amount to keep stable
        #[arg(long)]
        target_usd: String,
        /// Balance (msat) deliberately excluded from stabilization
        #[arg(long, default_value_t = 0)]
        native_reserve_msat: u64,
        /// Run as the stable receiver (omit to run as the provider)
        #[arg(long, default_value_t = false)]
        stable_receiver: bool,
        /// Base URL of the channel node's REST surface
        #[arg(long, default_value = "http://127.0.0.1:9737")]
        node_url: String,
        /// Seconds between reconciliation cycles
        #[arg(long, default_value_t = 300)]
        cadence_secs: u64,
        /// Directory for the append-only cycle log
        #[arg(long, default_value = ".")]
        log_dir: String,
    },

    /// Query the price oracle once and print the median rate
    Rate {
        /// Target currency code
        #[arg(long, default_value = "USD")]
        currency: String,
    },
}
