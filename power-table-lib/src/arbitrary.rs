//! Proptest strategies for the types of this crate, available to downstream
//! crates through the `proptest` feature.

use crate::delegation::Delegation;
use crate::key::BtcKey;
use crate::params::Params;
use crate::registry::MemoryRegistry;
use proptest::collection::vec;
use proptest::prelude::*;

impl Arbitrary for BtcKey {
    type Parameters = ();
    type Strategy = BoxedStrategy<BtcKey>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        any::<[u8; 32]>().prop_map(BtcKey::from).boxed()
    }
}

impl Arbitrary for Delegation {
    type Parameters = ();
    type Strategy = BoxedStrategy<Delegation>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (
            0..1_000_000u64,
            0..1_000u64,
            0..2_000u64,
            0..4u32,
            proptest::bool::weighted(0.1),
        )
            .prop_map(
                |(total_sat, start_height, timelock, covenant_sigs, unbonded)| Delegation {
                    total_sat,
                    start_height,
                    end_height: start_height + timelock,
                    covenant_sigs,
                    unbonded,
                },
            )
            .boxed()
    }
}

impl Arbitrary for Params {
    type Parameters = ();
    type Strategy = BoxedStrategy<Params>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (1..4u32, 0..10u32, 0..200u64)
            .prop_map(
                |(covenant_quorum, max_active_validators, finalization_timeout)| Params {
                    covenant_quorum,
                    max_active_validators,
                    finalization_timeout,
                },
            )
            .boxed()
    }
}

impl Arbitrary for MemoryRegistry {
    type Parameters = ();
    type Strategy = BoxedStrategy<MemoryRegistry>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        let validator = (
            any::<BtcKey>(),
            proptest::option::weighted(0.2, any::<u64>()),
            vec((any::<BtcKey>(), any::<Delegation>()), 0..6),
        );
        vec(validator, 0..12)
            .prop_map(|validators| {
                let mut registry = MemoryRegistry::new();
                for (key, slashed_height, delegations) in validators {
                    registry.register_validator(key);
                    for (delegator, delegation) in delegations {
                        registry.add_delegation(key, delegator, delegation);
                    }
                    if let Some(height) = slashed_height {
                        registry.slash_validator(key, height);
                    }
                }
                registry
            })
            .boxed()
    }
}
