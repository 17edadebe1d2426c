use serde::{Deserialize, Serialize};

/// BTC locked in a staking transaction in favour of a validator.
///
/// Heights are BTC heights. The delegation only counts once enough covenant
/// members signed its slashing/unbonding path, and stops counting `w` blocks
/// before its timelock expires so that the unbonding can not race finality.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Delegation {
    /// Staked amount, in satoshi
    pub total_sat: u64,
    pub start_height: u64,
    pub end_height: u64,
    #[serde(default)]
    pub covenant_sigs: u32,
    /// Set once the delegator completed an early unbonding
    #[serde(default)]
    pub unbonded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelegationStatus {
    Pending,
    Active,
    Unbonded,
}

impl Delegation {
    pub fn status(&self, btc_tip: u64, w: u64, covenant_quorum: u32) -> DelegationStatus {
        if self.unbonded {
            return DelegationStatus::Unbonded;
        }
        if self.covenant_sigs < covenant_quorum || btc_tip < self.start_height {
            return DelegationStatus::Pending;
        }
        // btc_tip + w <= end_height, written so that it can not overflow
        match self.end_height.checked_sub(w) {
            Some(last_active) if btc_tip <= last_active => DelegationStatus::Active,
            _ => DelegationStatus::Unbonded,
        }
    }
}

/// Scores a single delegation. Must be pure: every node evaluates it over the
/// same inputs and has to obtain the same result.
pub trait VotingPowerFunction {
    fn voting_power(
        &self,
        delegation: &Delegation,
        btc_tip: u64,
        w: u64,
        covenant_quorum: u32,
    ) -> u64;
}

/// Active delegations weigh their full amount, every other status nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActiveStakeWeighting;

impl VotingPowerFunction for ActiveStakeWeighting {
    fn voting_power(
        &self,
        delegation: &Delegation,
        btc_tip: u64,
        w: u64,
        covenant_quorum: u32,
    ) -> u64 {
        match delegation.status(btc_tip, w, covenant_quorum) {
            DelegationStatus::Active => delegation.total_sat,
            DelegationStatus::Pending | DelegationStatus::Unbonded => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    fn delegation(covenant_sigs: u32) -> Delegation {
        Delegation {
            total_sat: 10_000,
            start_height: 100,
            end_height: 1_000,
            covenant_sigs,
            unbonded: false,
        }
    }

    #[test]
    fn status_transitions() {
        let del = delegation(3);
        assert_eq!(del.status(99, 10, 3), DelegationStatus::Pending);
        assert_eq!(del.status(100, 10, 3), DelegationStatus::Active);
        assert_eq!(del.status(990, 10, 3), DelegationStatus::Active);
        assert_eq!(del.status(991, 10, 3), DelegationStatus::Unbonded);
        // not enough covenant signatures
        assert_eq!(delegation(2).status(500, 10, 3), DelegationStatus::Pending);
    }

    #[test]
    fn unbonded_never_counts() {
        let del = Delegation {
            unbonded: true,
            ..delegation(3)
        };
        assert_eq!(ActiveStakeWeighting.voting_power(&del, 500, 10, 1), 0);
    }

    #[test]
    fn window_larger_than_timelock() {
        assert_eq!(delegation(1).status(100, 5_000, 1), DelegationStatus::Unbonded);
        assert_eq!(
            delegation(1).status(u64::MAX, u64::MAX, 1),
            DelegationStatus::Unbonded
        );
    }

    #[test]
    fn deserialize_with_defaults() {
        let del: Delegation = serde_json::from_str(
            r#"{"total_sat": 10000, "start_height": 100, "end_height": 1000}"#,
        )
        .unwrap();
        assert_eq!(del, delegation(0));
    }

    #[proptest]
    fn power_is_all_or_nothing(
        total_sat: u64,
        start_height: u64,
        end_height: u64,
        covenant_sigs: u32,
        btc_tip: u64,
        w: u64,
        quorum: u32,
    ) {
        let del = Delegation {
            total_sat,
            start_height,
            end_height,
            covenant_sigs,
            unbonded: false,
        };
        let power = ActiveStakeWeighting.voting_power(&del, btc_tip, w, quorum);
        assert!(power == 0 || power == total_sat);
        if power > 0 {
            assert!(covenant_sigs >= quorum);
            assert!(start_height <= btc_tip);
        }
    }
}
