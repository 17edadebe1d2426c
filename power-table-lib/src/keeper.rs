use crate::context::BlockContext;
use crate::delegation::{ActiveStakeWeighting, VotingPowerFunction};
use crate::key::ValidatorKey;
use crate::kv::{KvStore, WriteBatch};
use crate::registry::{DelegationRegistry, ValidatorRegistry};
use crate::selector::{TopByPower, TopNSelector};
use crate::tally::{Tally, TallyOutcome};
use crate::voting_power::{PowerTable, VotingPowerStore};
use crate::Error;
use std::collections::BTreeMap;
use tracing::error;

/// Entry point of the block harness into the voting power table.
///
/// Once per block, after every staking mutation of the block was applied,
/// the harness calls [`PowerTableKeeper::record_snapshot`] and commits the
/// returned batch together with the rest of the block.
pub struct PowerTableKeeper<S> {
    store: VotingPowerStore<S>,
    weighting: Box<dyn VotingPowerFunction + Send + Sync>,
    selector: Box<dyn TopNSelector + Send + Sync>,
}

impl<S: KvStore> PowerTableKeeper<S> {
    pub fn new(kv: S) -> Self {
        Self {
            store: VotingPowerStore::new(kv),
            weighting: Box::new(ActiveStakeWeighting),
            selector: Box::new(TopByPower),
        }
    }

    pub fn with_weighting(
        mut self,
        weighting: impl VotingPowerFunction + Send + Sync + 'static,
    ) -> Self {
        self.weighting = Box::new(weighting);
        self
    }

    pub fn with_selector(mut self, selector: impl TopNSelector + Send + Sync + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn store(&self) -> &VotingPowerStore<S> {
        &self.store
    }

    /// Tallies `ctx.height()` and stages its table into the context's batch.
    ///
    /// Every error returned here is fatal for the block: see [`Error::is_fatal`].
    pub fn record_snapshot<R>(
        &self,
        ctx: &mut BlockContext,
        registry: &R,
    ) -> Result<TallyOutcome, Error>
    where
        R: ValidatorRegistry + DelegationRegistry,
    {
        let height = ctx.height();
        let tally = Tally::new(registry, registry)
            .with_weighting(self.weighting.as_ref())
            .with_selector(self.selector.as_ref());
        tally.run(ctx, &self.store).map_err(|e| {
            error!(height, error = %e, "voting power table not recorded");
            e
        })
    }

    pub fn commit(&self, batch: WriteBatch) {
        self.store.kv().commit(batch);
    }

    /// Voting power of `validator` at `height`.
    ///
    /// Zero if the validator is not registered, was slashed since, or is not
    /// part of the table at `height`.
    pub fn voting_power(
        &self,
        registry: &dyn ValidatorRegistry,
        validator: &ValidatorKey,
        height: u64,
    ) -> Result<u64, Error> {
        match registry.validator(validator.as_ref()) {
            Some(v) if !v.is_slashed() => self.store.get(height, validator),
            _ => Ok(0),
        }
    }

    pub fn has_snapshot(&self, height: u64) -> bool {
        self.store.has_snapshot(height)
    }

    pub fn snapshot(&self, height: u64) -> Result<Option<PowerTable>, Error> {
        self.store.snapshot(height)
    }

    pub fn snapshot_hex(&self, height: u64) -> Result<Option<BTreeMap<String, u64>>, Error> {
        self.store.snapshot_hex(height)
    }

    pub fn activation_height(&self) -> Result<u64, Error> {
        self.store.activation_height()
    }

    pub fn is_activated(&self) -> bool {
        self.store.is_activated()
    }
}
