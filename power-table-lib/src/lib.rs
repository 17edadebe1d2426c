mod activation;
#[cfg(any(test, feature = "proptest"))]
pub mod arbitrary;
pub mod context;
pub mod delegation;
pub mod key;
pub mod keeper;
pub mod kv;
pub mod params;
pub mod registry;
pub mod selector;
pub mod tally;
pub mod voting_power;

pub use context::{BlockContext, BtcTipOracle};
pub use delegation::{ActiveStakeWeighting, Delegation, DelegationStatus, VotingPowerFunction};
pub use key::{BtcKey, DelegatorKey, ValidatorKey, BTC_KEY_LEN};
pub use keeper::PowerTableKeeper;
pub use kv::{KvStore, MemoryStore, WriteBatch};
pub use params::Params;
pub use registry::{DelegationRegistry, MemoryRegistry, Validator, ValidatorRegistry};
pub use selector::{Candidate, TopByPower, TopNSelector};
pub use tally::{SkipReason, Tally, TallyOutcome};
pub use voting_power::{PowerTable, VotingPowerStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid key length: expected {expected} bytes, found {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Persisted data no longer matches the schema. Continuing would risk
    /// a consensus divergence, so the block harness must halt on it.
    #[error("corrupted state: {0}")]
    CorruptedState(String),

    #[error("voting power table already recorded at height {0}")]
    SnapshotAlreadyRecorded(u64),

    #[error("BTC staking protocol is not activated yet")]
    NotActivated,

    #[error("BTC tip height unavailable: {0}")]
    TipUnavailable(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl Error {
    /// Errors after which block processing must not continue.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::CorruptedState(_) | Error::SnapshotAlreadyRecorded(_)
        )
    }
}
