use crate::context::BlockContext;
use crate::delegation::{ActiveStakeWeighting, VotingPowerFunction};
use crate::key::{DelegatorKey, ValidatorKey};
use crate::kv::KvStore;
use crate::params::Params;
use crate::registry::{DelegationRegistry, ValidatorRegistry};
use crate::selector::{Candidate, TopByPower, TopNSelector};
use crate::voting_power::{height_prefix, VotingPowerStore};
use crate::Error;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The BTC tip height could not be read; the height is not retried.
    TipUnavailable,
    /// No validator ended up with voting power.
    NoActiveValidators,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TallyOutcome {
    Recorded {
        height: u64,
        validators: usize,
        total_power: u64,
    },
    Skipped {
        height: u64,
        reason: SkipReason,
    },
}

impl TallyOutcome {
    pub fn height(&self) -> u64 {
        match self {
            TallyOutcome::Recorded { height, .. } | TallyOutcome::Skipped { height, .. } => *height,
        }
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, TallyOutcome::Recorded { .. })
    }
}

/// Computes the voting power table of one height.
///
/// The tally only reads its collaborators and stages its result in the
/// block's write batch, so it can be built anew for every block.
pub struct Tally<'a> {
    validators: &'a dyn ValidatorRegistry,
    delegations: &'a dyn DelegationRegistry,
    weighting: &'a dyn VotingPowerFunction,
    selector: &'a dyn TopNSelector,
}

impl<'a> Tally<'a> {
    pub fn new(
        validators: &'a dyn ValidatorRegistry,
        delegations: &'a dyn DelegationRegistry,
    ) -> Self {
        Self {
            validators,
            delegations,
            weighting: &ActiveStakeWeighting,
            selector: &TopByPower,
        }
    }

    pub fn with_weighting(mut self, weighting: &'a dyn VotingPowerFunction) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_selector(mut self, selector: &'a dyn TopNSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Every non slashed validator with a positive voting power at `btc_tip`,
    /// in ascending key order.
    pub fn candidates(&self, btc_tip: u64, params: &Params) -> Result<Vec<Candidate>, Error> {
        let mut candidates = Vec::new();
        for raw in self.validators.validator_keys() {
            let key = ValidatorKey::from_bytes(raw).map_err(|e| {
                Error::CorruptedState(format!("validator key {}: {}", hex::encode(raw), e))
            })?;
            let validator = self.validators.validator(raw).ok_or_else(|| {
                Error::CorruptedState(format!("validator {} is enumerated but not stored", key))
            })?;
            if validator.is_slashed() {
                debug!(validator = %key, "skipping slashed validator");
                continue;
            }

            let mut voting_power = 0u64;
            for (delegator, delegations) in self.delegations.delegators(&key) {
                // decoded only to reject a malformed key
                let _delegator = DelegatorKey::from_bytes(delegator).map_err(|e| {
                    Error::CorruptedState(format!(
                        "delegator key {} of validator {}: {}",
                        hex::encode(delegator),
                        key,
                        e
                    ))
                })?;
                for delegation in delegations {
                    voting_power = voting_power.saturating_add(self.weighting.voting_power(
                        delegation,
                        btc_tip,
                        params.finalization_timeout,
                        params.covenant_quorum,
                    ));
                }
            }

            if voting_power == 0 {
                debug!(validator = %key, "validator has no voting power");
                continue;
            }
            debug!(validator = %key, voting_power);
            candidates.push(Candidate { key, voting_power });
        }
        Ok(candidates)
    }

    /// Stages the table of `ctx.height()` into the block's batch.
    ///
    /// A height without any validator with voting power gets no entry at
    /// all. Nothing is staged when an error is returned.
    pub fn run<S: KvStore>(
        &self,
        ctx: &mut BlockContext,
        store: &VotingPowerStore<S>,
    ) -> Result<TallyOutcome, Error> {
        let height = ctx.height();
        if store.has_snapshot(height) || ctx.batch().contains_prefix(&height_prefix(height)) {
            return Err(Error::SnapshotAlreadyRecorded(height));
        }

        let btc_tip = match ctx.btc_tip_height() {
            Ok(tip) => tip,
            Err(e) => {
                warn!(height, error = %e, "no voting power table, BTC tip unavailable");
                return Ok(TallyOutcome::Skipped {
                    height,
                    reason: SkipReason::TipUnavailable,
                });
            }
        };

        let candidates = self.candidates(btc_tip, ctx.params())?;
        let cap = usize::try_from(ctx.params().max_active_validators).unwrap_or(usize::MAX);
        let active = if candidates.is_empty() {
            candidates
        } else {
            self.selector.select(candidates, cap)
        };
        if active.is_empty() {
            warn!(height, btc_tip, "no voting power table, no active validator");
            return Ok(TallyOutcome::Skipped {
                height,
                reason: SkipReason::NoActiveValidators,
            });
        }

        let mut total_power = 0u64;
        for candidate in &active {
            store.put(ctx.batch_mut(), height, &candidate.key, candidate.voting_power);
            total_power = total_power.saturating_add(candidate.voting_power);
        }
        info!(
            height,
            btc_tip,
            validators = active.len(),
            total_power,
            "voting power table recorded"
        );
        Ok(TallyOutcome::Recorded {
            height,
            validators: active.len(),
            total_power,
        })
    }
}
