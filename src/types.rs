//! Core domain types shared across the stability engine.
//!
//! All native amounts are millisatoshis (`u64`), the smallest unit the
//! channel node reports. Dollar amounts are `rust_decimal::Decimal`; no
//! floating point crosses a cycle boundary.

use rust_decimal::Decimal;

/// Millisatoshis in one whole bitcoin (10^11).
pub const MSATS_PER_BTC: u64 = 100_000_000_000;

/// The long-lived description of one stabilized channel.
///
/// Created once at startup from configuration and immutable for the life
/// of the monitor worker. The reconciliation engine reads it every cycle
/// but never writes it.
#[derive(Debug, Clone)]
pub struct ChannelAgreement {
    /// Identifier of the monitored channel on the node.
    pub channel_id: String,
    /// Node identity of the counterparty; the only legal keysend target.
    pub counterparty: String,
    /// True if this process is the stable receiver (pegged side),
    /// false if it is the stable provider absorbing volatility.
    pub is_stable_receiver: bool,
    /// Dollar amount the stable receiver's balance is pegged to.
    pub target_usd: Decimal,
    /// Portion of the balance deliberately excluded from stabilization.
    pub native_reserve_msat: u64,
}

impl ChannelAgreement {
    /// Balance of the stable receiver's side, net of the native reserve.
    ///
    /// Both parties run the same engine; which of the two balances is the
    /// "stable side" depends on which role this process plays.
    pub fn stable_side_balance(&self, our_msat: u64, their_msat: u64) -> u64 {
        let receiver_balance = if self.is_stable_receiver {
            our_msat
        } else {
            their_msat
        };
        receiver_balance.saturating_sub(self.native_reserve_msat)
    }
}

/// Per-agreement mutable state, owned exclusively by the single active
/// reconciliation cycle. Never shared across concurrent cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationState {
    /// Our side's balance at the last balance read, in msat.
    pub our_balance_msat: u64,
    /// Counterparty's balance at the last balance read, in msat.
    pub their_balance_msat: u64,
    /// Last computed dollar value of the stable side (3 decimal places).
    pub stable_dollar_value: Decimal,
    /// Monotonic count of cycles where an expected incoming payment
    /// failed to confirm within tolerance.
    pub risk_score: u32,
    /// Whether the most recent cycle resulted in a payment.
    pub payment_made: bool,
}
