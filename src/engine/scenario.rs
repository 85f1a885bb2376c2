//! Pure scenario classification.
//!
//! The decision table is separated from effect execution so it can be
//! unit-tested without a node or a network. Exactly one scenario matches
//! any (target, current, role) triple.

use rust_decimal::Decimal;

/// Dollar tolerance under which drift is ignored.
pub const DOLLAR_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// What this cycle should do, given the drift and our role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Drift below tolerance; no action.
    Balanced,
    /// Stable side fell below target and we are the receiver: the
    /// counterparty owes us, wait and confirm.
    ReceiverAwaitingPayment,
    /// Stable side fell below target and we are the provider: pay now.
    ProviderMustPay,
    /// Stable side rose above target and we are the receiver: pay now.
    ReceiverMustPay,
    /// Stable side rose above target and we are the provider: the
    /// counterparty owes us, wait and confirm.
    ProviderAwaitingPayment,
}

impl Scenario {
    /// Whether this process dispatches a payment in this scenario.
    pub fn must_pay(&self) -> bool {
        matches!(self, Scenario::ProviderMustPay | Scenario::ReceiverMustPay)
    }

    /// Whether this process expects an incoming payment in this scenario.
    pub fn awaits_payment(&self) -> bool {
        matches!(
            self,
            Scenario::ReceiverAwaitingPayment | Scenario::ProviderAwaitingPayment
        )
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scenario::Balanced => "balanced",
            Scenario::ReceiverAwaitingPayment => "receiver-awaiting-payment",
            Scenario::ProviderMustPay => "provider-must-pay",
            Scenario::ReceiverMustPay => "receiver-must-pay",
            Scenario::ProviderAwaitingPayment => "provider-awaiting-payment",
        };
        write!(f, "{name}")
    }
}

/// Classify the current drift into exactly one scenario.
///
/// `current` is the stable side's present dollar value; `target` is the
/// pegged amount. Balance wins over either directional branch when the
/// drift is inside [`DOLLAR_EPSILON`].
pub fn classify(target: Decimal, current: Decimal, is_stable_receiver: bool) -> Scenario {
    if (target - current).abs() < DOLLAR_EPSILON {
        return Scenario::Balanced;
    }
    match (current < target, is_stable_receiver) {
        (true, true) => Scenario::ReceiverAwaitingPayment,
        (true, false) => Scenario::ProviderMustPay,
        (false, true) => Scenario::ReceiverMustPay,
        (false, false) => Scenario::ProviderAwaitingPayment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn epsilon_is_one_cent() {
        assert_eq!(DOLLAR_EPSILON, dec!(0.01));
    }

    #[test]
    fn drift_under_a_cent_is_balanced_for_both_roles() {
        // 99.999 vs 100.00 differs by 0.001.
        assert_eq!(classify(dec!(100), dec!(99.999), true), Scenario::Balanced);
        assert_eq!(classify(dec!(100), dec!(99.999), false), Scenario::Balanced);
        assert_eq!(classify(dec!(100), dec!(100.009), true), Scenario::Balanced);
        assert_eq!(classify(dec!(100), dec!(100), false), Scenario::Balanced);
    }

    #[test]
    fn exactly_one_cent_is_not_balanced() {
        assert_ne!(classify(dec!(100), dec!(99.99), true), Scenario::Balanced);
        assert_ne!(classify(dec!(100), dec!(100.01), true), Scenario::Balanced);
    }

    #[test]
    fn below_target_routes_by_role() {
        assert_eq!(
            classify(dec!(100), dec!(90), true),
            Scenario::ReceiverAwaitingPayment
        );
        assert_eq!(
            classify(dec!(100), dec!(90), false),
            Scenario::ProviderMustPay
        );
    }

    #[test]
    fn above_target_routes_by_role() {
        assert_eq!(
            classify(dec!(100), dec!(105), true),
            Scenario::ReceiverMustPay
        );
        assert_eq!(
            classify(dec!(100), dec!(105), false),
            Scenario::ProviderAwaitingPayment
        );
    }

    #[test]
    fn payer_and_awaiter_are_mirror_images() {
        for (target, current) in [
            (dec!(100), dec!(42.5)),
            (dec!(100), dec!(157)),
            (dec!(25), dec!(24.98)),
        ] {
            let receiver = classify(target, current, true);
            let provider = classify(target, current, false);
            assert_eq!(receiver.must_pay(), provider.awaits_payment());
            assert_eq!(receiver.awaits_payment(), provider.must_pay());
        }
    }
}
