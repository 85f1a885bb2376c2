//! Payment dispatcher.
//!
//! Issues the one-shot compensating keysend and captures the outcome.
//! A node-level payment failure is contained here as an attempt outcome;
//! only a dispatch to anything other than the agreed counterparty is a
//! hard error, since that can only be a bug upstream.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::node::ChannelNode;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("refusing dispatch to {got}: agreement counterparty is {expected}")]
    WrongDestination { expected: String, got: String },
}

/// How a single dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
    /// Expected incoming payment did not land within the wait.
    Unconfirmed,
}

/// Ephemeral record of one dispatch attempt, used within a cycle to
/// decide risk updates and the cycle record.
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    pub destination: String,
    pub amount_msat: u64,
    pub outcome: PaymentOutcome,
}

/// Dispatches compensating payments to the agreed counterparty.
pub struct PaymentDispatcher<N: ChannelNode> {
    node: Arc<N>,
    counterparty: String,
}

impl<N: ChannelNode> PaymentDispatcher<N> {
    pub fn new(node: Arc<N>, counterparty: String) -> Self {
        Self { node, counterparty }
    }

    /// Send `amount_msat` to `destination`.
    ///
    /// Zero-amount dispatches are skipped and reported as succeeded; a
    /// destination other than the configured counterparty is rejected
    /// before anything reaches the node.
    pub async fn pay(
        &self,
        destination: &str,
        amount_msat: u64,
    ) -> Result<PaymentAttempt, DispatchError> {
        if destination != self.counterparty {
            return Err(DispatchError::WrongDestination {
                expected: self.counterparty.clone(),
                got: destination.to_string(),
            });
        }

        if amount_msat == 0 {
            return Ok(PaymentAttempt {
                destination: destination.to_string(),
                amount_msat,
                outcome: PaymentOutcome::Succeeded,
            });
        }

        let outcome = match self.node.keysend(destination, amount_msat).await {
            Ok(()) => {
                info!(destination, amount_msat, "compensating payment sent");
                PaymentOutcome::Succeeded
            }
            Err(e) => {
                error!(destination, amount_msat, error = %e, "payment dispatch failed");
                PaymentOutcome::Failed
            }
        };

        Ok(PaymentAttempt {
            destination: destination.to_string(),
            amount_msat,
            outcome,
        })
    }
}
