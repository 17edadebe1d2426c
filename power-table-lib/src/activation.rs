//! The BTC staking protocol is activated at the first height where some
//! validator has voting power. Nothing is indexed or tallied before it.

use crate::kv::KvStore;
use crate::voting_power::{split_entry_key, VotingPowerStore, VOTING_POWER_KEY};
use crate::Error;

impl<S: KvStore> VotingPowerStore<S> {
    /// The first height with a voting power table.
    ///
    /// Entries are keyed by height first, so this is the height segment of
    /// the very first key of the section. The validator key that follows it
    /// must not leak into the decoded height.
    pub fn activation_height(&self) -> Result<u64, Error> {
        let (key, _) = self
            .kv()
            .first_with_prefix(VOTING_POWER_KEY)
            .ok_or(Error::NotActivated)?;
        split_entry_key(&key).map(|(height, _)| height)
    }

    pub fn is_activated(&self) -> bool {
        self.kv().first_with_prefix(VOTING_POWER_KEY).is_some()
    }
}
