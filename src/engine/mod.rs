//! Reconciliation engine.
//!
//! Once per scheduled cycle the engine converts the target dollar amount
//! to native units through the price oracle, reads fresh channel
//! balances, classifies the drift into one of five scenarios, and either
//! pays the counterparty or waits for the counterparty to pay. Every
//! cycle recomputes from scratch off fresh balances, so no rounding
//! drift compounds across cycles.

pub mod dispatch;
pub mod scenario;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::logging::{CycleRecord, CycleRecorder};
use crate::node::{channel_balances, ChannelNode, NodeError};
use crate::oracle::{OracleError, RateProvider, RateQuote};
use crate::risk::DelinquencyTracker;
use crate::types::{ChannelAgreement, ReconciliationState};

pub use dispatch::{DispatchError, PaymentAttempt, PaymentDispatcher, PaymentOutcome};
pub use scenario::{classify, Scenario, DOLLAR_EPSILON};

/// How long to give the counterparty to land an expected payment before
/// counting it against their risk score.
pub const CONFIRMATION_WAIT: Duration = Duration::from_secs(30);

/// A cycle-level failure. Contained to the cycle that produced it; the
/// next scheduled cycle is an independent retry.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

enum ConfirmOutcome {
    Confirmed,
    Unconfirmed,
    Cancelled,
}

/// Drives one channel agreement. Owns the per-agreement state; exactly
/// one cycle runs at a time because the monitor awaits each `run_cycle`
/// before scheduling the next.
pub struct Reconciler<N: ChannelNode, R: RateProvider> {
    agreement: ChannelAgreement,
    node: Arc<N>,
    rates: Arc<R>,
    dispatcher: PaymentDispatcher<N>,
    risk: DelinquencyTracker,
    recorder: Arc<dyn CycleRecorder>,
    state: ReconciliationState,
    confirmation_wait: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<N: ChannelNode, R: RateProvider> Reconciler<N, R> {
    pub fn new(
        agreement: ChannelAgreement,
        node: Arc<N>,
        rates: Arc<R>,
        recorder: Arc<dyn CycleRecorder>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let dispatcher = PaymentDispatcher::new(Arc::clone(&node), agreement.counterparty.clone());
        Self {
            agreement,
            node,
            rates,
            dispatcher,
            risk: DelinquencyTracker::new(),
            recorder,
            state: ReconciliationState::default(),
            confirmation_wait: CONFIRMATION_WAIT,
            shutdown,
        }
    }

    /// Override the confirmation wait (tests shrink it; production keeps
    /// the default).
    #[must_use]
    pub fn with_confirmation_wait(mut self, wait: Duration) -> Self {
        self.confirmation_wait = wait;
        self
    }

    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    pub fn agreement(&self) -> &ChannelAgreement {
        &self.agreement
    }

    /// Run one reconciliation cycle.
    ///
    /// Oracle or balance failures abort the cycle before any side effect;
    /// a cycle that got as far as classification always appends a record,
    /// whatever the outcome.
    pub async fn run_cycle(&mut self) -> Result<(), CycleError> {
        let quote = self.rates.usd_rate().await?;
        let expected_msat = quote.native_amount(self.agreement.target_usd);

        let (ours, theirs) = channel_balances(&*self.node, &self.agreement.channel_id).await?;
        self.state.our_balance_msat = ours;
        self.state.their_balance_msat = theirs;

        let stable_side = self.agreement.stable_side_balance(ours, theirs);
        let current = quote.dollar_value(stable_side);
        self.state.stable_dollar_value = current;
        self.state.payment_made = false;

        let scenario = classify(
            self.agreement.target_usd,
            current,
            self.agreement.is_stable_receiver,
        );
        info!(
            %scenario,
            target = %self.agreement.target_usd,
            current = %current,
            expected_msat,
            stable_side_msat = stable_side,
            "cycle classified"
        );

        match scenario {
            Scenario::Balanced => {}
            Scenario::ProviderMustPay | Scenario::ReceiverMustPay => {
                let amount = expected_msat.abs_diff(stable_side);
                let counterparty = self.agreement.counterparty.clone();
                let attempt = self.dispatcher.pay(&counterparty, amount).await?;
                if attempt.outcome == PaymentOutcome::Failed {
                    warn!(amount_msat = amount, "dispatch failed; counterparty will see the shortfall");
                }
                // Records the attempt, not confirmed receipt: the payer
                // has no receipt signal at this layer.
                self.state.payment_made = true;
            }
            Scenario::ReceiverAwaitingPayment | Scenario::ProviderAwaitingPayment => {
                match self.await_incoming(&quote).await? {
                    ConfirmOutcome::Confirmed => self.state.payment_made = true,
                    ConfirmOutcome::Unconfirmed => {
                        self.state.risk_score = self.risk.record_missed();
                    }
                    ConfirmOutcome::Cancelled => {
                        debug!("confirmation wait cancelled; skipping risk update");
                    }
                }
            }
        }

        self.record_cycle(&quote).await;
        Ok(())
    }

    /// Give the counterparty time to pay, then re-read balances and check
    /// the peg within tolerance. Shutdown short-circuits the wait.
    async fn await_incoming(&mut self, quote: &RateQuote) -> Result<ConfirmOutcome, CycleError> {
        let mut shutdown = self.shutdown.clone();
        let sleep = tokio::time::sleep(self.confirmation_wait);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => break,
                changed = shutdown.changed() => match changed {
                    Ok(()) if *shutdown.borrow() => return Ok(ConfirmOutcome::Cancelled),
                    Ok(()) => continue,
                    Err(_) => {
                        // Shutdown channel gone; wait out the clock.
                        (&mut sleep).await;
                        break;
                    }
                },
            }
        }

        let (ours, theirs) = channel_balances(&*self.node, &self.agreement.channel_id).await?;
        self.state.our_balance_msat = ours;
        self.state.their_balance_msat = theirs;

        let stable_side = self.agreement.stable_side_balance(ours, theirs);
        let current = quote.dollar_value(stable_side);
        self.state.stable_dollar_value = current;

        if (self.agreement.target_usd - current).abs() < DOLLAR_EPSILON {
            info!(current = %current, "expected payment confirmed");
            Ok(ConfirmOutcome::Confirmed)
        } else {
            Ok(ConfirmOutcome::Unconfirmed)
        }
    }

    /// Append the cycle record. Never fatal.
    async fn record_cycle(&mut self, quote: &RateQuote) {
        self.state.risk_score = self.risk.count();
        let record = CycleRecord::new(
            Utc::now(),
            quote.estimated_price(),
            self.agreement.target_usd,
            self.state.stable_dollar_value,
            self.state.payment_made,
            self.state.risk_score,
        );
        if let Err(e) = self.recorder.append(&record).await {
            warn!(error = %e, "failed to append cycle record");
        }
    }
}
