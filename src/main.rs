use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stablechannels::cli::{Cli, Commands, MonitorConfig};
use stablechannels::engine::Reconciler;
use stablechannels::logging::{CycleRecorder, JsonlRecorder, MultiRecorder, TracingRecorder};
use stablechannels::monitor;
use stablechannels::node::RestChannelNode;
use stablechannels::oracle::PriceOracle;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from the .env file
    dotenv().ok();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.verbose.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            channel_id,
            counterparty,
            target_usd,
            native_reserve_msat,
            stable_receiver,
            node_url,
            cadence_secs,
            log_dir,
        } => {
            let config = MonitorConfig::from_args(
                channel_id,
                counterparty,
                &target_usd,
                native_reserve_msat,
                stable_receiver,
                node_url,
                cadence_secs,
                log_dir,
            )?;
            run_monitor(config).await?;
        }
        Commands::Rate { currency } => {
            print_rate(&currency).await?;
        }
    }

    Ok(())
}

/// Start the monitor for one channel agreement and run until ctrl-c.
async fn run_monitor(config: MonitorConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        channel_id = %config.channel_id,
        target_usd = %config.target_usd,
        is_stable_receiver = config.is_stable_receiver,
        "starting stable channel monitor"
    );

    let auth_token = std::env::var("NODE_AUTH_TOKEN").ok();
    let node = Arc::new(RestChannelNode::new(config.node_url.clone(), auth_token)?);
    let oracle = Arc::new(PriceOracle::new());

    let recorder: Arc<dyn CycleRecorder> = Arc::new(MultiRecorder::new(vec![
        Arc::new(JsonlRecorder::for_role(
            &config.log_dir,
            config.is_stable_receiver,
        )),
        Arc::new(TracingRecorder::new()),
    ]));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler = Reconciler::new(config.agreement(), node, oracle, recorder, shutdown_rx);
    let handle = monitor::spawn(reconciler, config.cadence, shutdown_tx);

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    handle.shutdown().await;

    Ok(())
}

/// One-shot oracle query for the `rate` subcommand.
async fn print_rate(currency: &str) -> Result<(), Box<dyn std::error::Error>> {
    let oracle = PriceOracle::new();
    let quote = oracle.rate(currency).await?;
    println!(
        "{} per BTC: {} ({} msat per unit, {} source(s): {})",
        currency.to_uppercase(),
        quote.estimated_price(),
        quote.msat_per_unit,
        quote.sources.len(),
        quote.sources.join(", ")
    );
    Ok(())
}
