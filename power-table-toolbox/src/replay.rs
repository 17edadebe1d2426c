//! Replays a scripted chain through the voting power table, one block at a
//! time, the way the block harness of a node would.

use crate::utils::serde::HexBytes;
use crate::Error;
use power_table_lib::{
    BlockContext, Delegation, MemoryRegistry, MemoryStore, Params, PowerTableKeeper,
    TallyOutcome, ValidatorRegistry,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Staking events of one block, applied before its voting power table is
/// tallied.
#[derive(Deserialize, Clone, Debug)]
pub struct BlockScript {
    pub height: u64,
    /// `None` when the BTC light client can not answer at this height.
    #[serde(default)]
    pub btc_tip: Option<u64>,
    #[serde(default)]
    pub validators: Vec<HexBytes>,
    #[serde(default)]
    pub delegations: Vec<DelegationRow>,
    #[serde(default)]
    pub slash: Vec<HexBytes>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DelegationRow {
    pub validator: HexBytes,
    pub delegator: HexBytes,
    #[serde(flatten)]
    pub delegation: Delegation,
}

/// One line of the replay output.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PowerRecord {
    pub height: u64,
    pub validator: String,
    pub voting_power: u64,
}

#[derive(Debug, Default)]
pub struct ReplayReport {
    pub entries: Vec<PowerRecord>,
    pub outcomes: Vec<TallyOutcome>,
    pub activation_height: Option<u64>,
}

impl BlockScript {
    fn apply(&self, registry: &mut MemoryRegistry) {
        for validator in &self.validators {
            if !registry.register_validator(validator) {
                warn!(
                    height = self.height,
                    validator = %hex::encode(validator),
                    "validator already registered"
                );
            }
        }
        for row in &self.delegations {
            if !registry.has_validator(row.validator.as_ref()) {
                warn!(
                    height = self.height,
                    validator = %hex::encode(&row.validator),
                    "delegation to an unknown validator"
                );
            }
            registry.add_delegation(&row.validator, &row.delegator, row.delegation.clone());
        }
        for validator in &self.slash {
            if registry.slash_validator(validator, self.height) {
                debug!(height = self.height, validator = %hex::encode(validator), "slashed");
            } else {
                warn!(height = self.height, validator = %hex::encode(validator), "not slashable");
            }
        }
    }
}

/// Runs every block in order and collects the recorded tables.
///
/// Stops at the first fatal error, as a node would halt.
pub fn replay(blocks: &[BlockScript], params: &Params) -> Result<ReplayReport, Error> {
    params.validate()?;

    let keeper = PowerTableKeeper::new(MemoryStore::new());
    let mut registry = MemoryRegistry::new();
    let mut report = ReplayReport::default();
    let mut previous: Option<u64> = None;

    for block in blocks {
        if let Some(previous) = previous.filter(|previous| block.height <= *previous) {
            return Err(Error::NonMonotonicHeight {
                previous,
                height: block.height,
            });
        }
        previous = Some(block.height);

        block.apply(&mut registry);
        let oracle = || {
            block.btc_tip.ok_or_else(|| {
                power_table_lib::Error::TipUnavailable(format!(
                    "no BTC tip at height {}",
                    block.height
                ))
            })
        };
        let mut ctx = BlockContext::new(block.height, params, &oracle);
        let outcome = keeper.record_snapshot(&mut ctx, &registry)?;
        keeper.commit(ctx.into_batch());

        if let Some(table) = keeper.snapshot(block.height)? {
            report
                .entries
                .extend(table.into_iter().map(|(validator, voting_power)| PowerRecord {
                    height: block.height,
                    validator: validator.to_hex(),
                    voting_power,
                }));
        }
        report.outcomes.push(outcome);
    }

    report.activation_height = match keeper.activation_height() {
        Ok(height) => Some(height),
        Err(power_table_lib::Error::NotActivated) => None,
        Err(e) => return Err(e.into()),
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use power_table_lib::tally::SkipReason;

    const SCRIPT: &str = r#"
- height: 1
  btc_tip: 100
  validators: ["0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"]
- height: 2
  btc_tip: 110
  delegations:
    - validator: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
      delegator: "0101010101010101010101010101010101010101010101010101010101010101"
      total_sat: 5000
      start_height: 105
      end_height: 10000
      covenant_sigs: 1
- height: 3
- height: 4
  btc_tip: 120
  slash: ["aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"]
"#;

    #[test]
    fn replays_a_script() {
        let blocks: Vec<BlockScript> = serde_yaml::from_str(SCRIPT).unwrap();
        let report = replay(&blocks, &Params::default()).unwrap();

        assert_eq!(
            report.entries,
            vec![PowerRecord {
                height: 2,
                validator: "aa".repeat(32),
                voting_power: 5000
            }]
        );
        assert_eq!(report.activation_height, Some(2));
        assert_eq!(
            report.outcomes.iter().map(TallyOutcome::is_recorded).collect::<Vec<_>>(),
            vec![false, true, false, false]
        );
        assert_eq!(
            report.outcomes[2],
            TallyOutcome::Skipped {
                height: 3,
                reason: SkipReason::TipUnavailable
            }
        );
    }

    #[test]
    fn heights_must_increase() {
        let mut blocks: Vec<BlockScript> = serde_yaml::from_str(SCRIPT).unwrap();
        blocks.swap(1, 2);
        assert!(matches!(
            replay(&blocks, &Params::default()),
            Err(Error::NonMonotonicHeight {
                previous: 3,
                height: 2
            })
        ));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = Params {
            covenant_quorum: 0,
            ..Params::default()
        };
        assert!(matches!(
            replay(&[], &params),
            Err(Error::PowerTable(power_table_lib::Error::InvalidParams(_)))
        ));
    }

    #[test]
    fn nothing_recorded_means_not_activated() {
        let report = replay(&[], &Params::default()).unwrap();
        assert!(report.entries.is_empty());
        assert_eq!(report.activation_height, None);
    }
}
