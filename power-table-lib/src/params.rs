use crate::Error;
use serde::{Deserialize, Serialize};

/// Chain parameters read by the tally. They are owned by other modules
/// and only ever read here, once per block.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Params {
    /// Minimum number of covenant signatures for a delegation to count.
    pub covenant_quorum: u32,
    /// Maximum number of validators with voting power at any height.
    pub max_active_validators: u32,
    /// `w`: BTC confirmations after which a BTC block is considered final.
    pub finalization_timeout: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            covenant_quorum: 1,
            max_active_validators: 100,
            finalization_timeout: 100,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), Error> {
        if self.covenant_quorum == 0 {
            return Err(Error::InvalidParams(
                "covenant quorum must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
