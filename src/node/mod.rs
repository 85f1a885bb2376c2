//! Channel node abstraction.
//!
//! The node hosting the payment channel is an external collaborator; the
//! engine only needs two calls from it: a channel/balance listing and a
//! keysend-style direct payment. `ChannelNode` is the seam mocks plug
//! into for tests.

pub mod rest;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub use rest::RestChannelNode;

/// Errors from node calls.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The balance listing had no channel matching the agreement.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("node http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered but refused the call.
    #[error("node rejected call ({status}): {message}")]
    Rpc { status: u16, message: String },
}

/// One channel as reported by the node's balance listing.
/// All amounts in millisatoshis.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSnapshot {
    pub channel_id: String,
    pub capacity_msat: u64,
    pub our_balance_msat: u64,
}

/// The two node calls the stability engine depends on.
#[async_trait]
pub trait ChannelNode: Send + Sync {
    /// List all channels with their current balances.
    async fn list_channels(&self) -> Result<Vec<ChannelSnapshot>, NodeError>;

    /// Send a direct no-invoice payment to a destination identity.
    async fn keysend(&self, destination: &str, amount_msat: u64) -> Result<(), NodeError>;
}

/// Read `(our, their)` balances for one channel.
///
/// The counterparty's balance is derived as capacity minus ours, never
/// queried directly, so the two always sum to the channel capacity.
pub async fn channel_balances(
    node: &dyn ChannelNode,
    channel_id: &str,
) -> Result<(u64, u64), NodeError> {
    let channels = node.list_channels().await?;
    let channel = channels
        .iter()
        .find(|c| c.channel_id == channel_id)
        .ok_or_else(|| NodeError::ChannelNotFound(channel_id.to_string()))?;

    let ours = channel.our_balance_msat;
    let theirs = channel.capacity_msat.saturating_sub(ours);
    debug_assert_eq!(ours + theirs, channel.capacity_msat);
    debug!(channel_id, ours, theirs, "balances read");
    Ok((ours, theirs))
}
