use crate::key::{ValidatorKey, BTC_KEY_LEN};
use crate::kv::{KvStore, WriteBatch};
use crate::Error;
use std::collections::BTreeMap;
use std::ops::ControlFlow;

/// Section of the keyspace owned by the voting power table.
///
/// Key: `VOTING_POWER_KEY || babylon height (u64 big-endian) || validator BTC PK`
/// Value: voting power in satoshi (u64 big-endian)
pub const VOTING_POWER_KEY: &[u8] = &[0x04];

pub(crate) const HEIGHT_LEN: usize = 8;
const POWER_LEN: usize = 8;

/// The voting power of every active validator at one height.
pub type PowerTable = BTreeMap<ValidatorKey, u64>;

pub(crate) fn height_prefix(height: u64) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(VOTING_POWER_KEY.len() + HEIGHT_LEN);
    prefix.extend_from_slice(VOTING_POWER_KEY);
    prefix.extend_from_slice(&height.to_be_bytes());
    prefix
}

fn entry_key(height: u64, validator: &ValidatorKey) -> Vec<u8> {
    let mut key = height_prefix(height);
    key.extend_from_slice(validator.as_ref());
    key
}

/// Splits a full entry key into its height and validator segments.
pub(crate) fn split_entry_key(key: &[u8]) -> Result<(u64, &[u8]), Error> {
    let rest = key
        .strip_prefix(VOTING_POWER_KEY)
        .ok_or_else(|| Error::CorruptedState(format!("foreign key {}", hex::encode(key))))?;
    if rest.len() < HEIGHT_LEN {
        return Err(Error::CorruptedState(format!(
            "voting power key {} is shorter than its height segment",
            hex::encode(key)
        )));
    }
    let (height, validator) = rest.split_at(HEIGHT_LEN);
    let mut height_bytes = [0u8; HEIGHT_LEN];
    height_bytes.copy_from_slice(height);
    Ok((u64::from_be_bytes(height_bytes), validator))
}

fn decode_power(value: &[u8]) -> Result<u64, Error> {
    <[u8; POWER_LEN]>::try_from(value)
        .map(u64::from_be_bytes)
        .map_err(|_| {
            Error::CorruptedState(format!(
                "voting power value of {} bytes, expected {}",
                value.len(),
                POWER_LEN
            ))
        })
}

/// Height partitioned voting power tables over a `KvStore`.
#[derive(Clone, Debug)]
pub struct VotingPowerStore<S> {
    kv: S,
}

impl<S: KvStore> VotingPowerStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Stages the voting power of `validator` at `height`. Visible once the
    /// batch is committed.
    pub fn put(
        &self,
        batch: &mut WriteBatch,
        height: u64,
        validator: &ValidatorKey,
        power: u64,
    ) {
        batch.put(entry_key(height, validator), power.to_be_bytes().to_vec());
    }

    /// Voting power stored for `validator` at `height`, zero if there is none.
    pub fn get(&self, height: u64, validator: &ValidatorKey) -> Result<u64, Error> {
        match self.kv.get(&entry_key(height, validator)) {
            Some(value) => decode_power(&value),
            None => Ok(0),
        }
    }

    pub fn has_snapshot(&self, height: u64) -> bool {
        self.kv.first_with_prefix(&height_prefix(height)).is_some()
    }

    /// The whole table at `height`, `None` if nothing was recorded there.
    /// A recorded table is never empty.
    pub fn snapshot(&self, height: u64) -> Result<Option<PowerTable>, Error> {
        let mut table = PowerTable::new();
        let mut failure = None;
        self.kv.scan_prefix(&height_prefix(height), &mut |key, value| {
            let entry = split_entry_key(key).and_then(|(_, validator)| {
                let validator = ValidatorKey::from_bytes(validator).map_err(|e| {
                    Error::CorruptedState(format!("validator in voting power table: {}", e))
                })?;
                Ok((validator, decode_power(value)?))
            });
            match entry {
                Ok((validator, power)) => {
                    table.insert(validator, power);
                    ControlFlow::Continue(())
                }
                Err(e) => {
                    failure = Some(e);
                    ControlFlow::Break(())
                }
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }
        Ok(if table.is_empty() { None } else { Some(table) })
    }

    /// Same as [`Self::snapshot`], keyed by the hex encoding of the validator keys.
    pub fn snapshot_hex(&self, height: u64) -> Result<Option<BTreeMap<String, u64>>, Error> {
        Ok(self.snapshot(height)?.map(|table| {
            table
                .into_iter()
                .map(|(validator, power)| (validator.to_hex(), power))
                .collect()
        }))
    }
}
