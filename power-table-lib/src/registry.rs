use crate::delegation::Delegation;
use crate::key::ValidatorKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Validator {
    /// Babylon height at which the validator was slashed.
    /// Slashing is terminal: a slashed validator never has voting power again.
    #[serde(default)]
    pub slashed_height: Option<u64>,
}

impl Validator {
    pub fn is_slashed(&self) -> bool {
        self.slashed_height.is_some()
    }
}

/// Registered validators. Keys are handed out exactly as persisted, decoding
/// them is up to the caller.
pub trait ValidatorRegistry {
    /// Every registered validator key, in ascending byte order.
    fn validator_keys(&self) -> Box<dyn Iterator<Item = &[u8]> + '_>;

    fn validator(&self, key: &[u8]) -> Option<Validator>;

    fn has_validator(&self, key: &[u8]) -> bool {
        self.validator(key).is_some()
    }
}

pub trait DelegationRegistry {
    /// Delegators of `validator` in ascending byte order of their (persisted)
    /// key, each with all of its delegations to that validator.
    fn delegators(
        &self,
        validator: &ValidatorKey,
    ) -> Box<dyn Iterator<Item = (&[u8], &[Delegation])> + '_>;
}

/// In-memory registry, used by the toolbox and in tests.
///
/// Keys are kept as raw bytes so that a registry can hold keys that do not
/// decode, the way a damaged store would.
#[derive(Clone, Debug, Default)]
pub struct MemoryRegistry {
    validators: BTreeMap<Vec<u8>, Validator>,
    delegations: BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, Vec<Delegation>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the validator was already registered.
    pub fn register_validator(&mut self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        if self.validators.contains_key(key) {
            return false;
        }
        self.validators.insert(key.to_vec(), Validator::default());
        true
    }

    /// Returns `true` only if the validator exists and was not slashed before.
    /// The first slashing height is kept.
    pub fn slash_validator(&mut self, key: impl AsRef<[u8]>, height: u64) -> bool {
        match self.validators.get_mut(key.as_ref()) {
            Some(validator) if !validator.is_slashed() => {
                validator.slashed_height = Some(height);
                true
            }
            _ => false,
        }
    }

    pub fn add_delegation(
        &mut self,
        validator: impl AsRef<[u8]>,
        delegator: impl AsRef<[u8]>,
        delegation: Delegation,
    ) {
        self.delegations
            .entry(validator.as_ref().to_vec())
            .or_default()
            .entry(delegator.as_ref().to_vec())
            .or_default()
            .push(delegation);
    }

    pub fn delegations_mut(
        &mut self,
        validator: impl AsRef<[u8]>,
        delegator: impl AsRef<[u8]>,
    ) -> Option<&mut Vec<Delegation>> {
        self.delegations
            .get_mut(validator.as_ref())?
            .get_mut(delegator.as_ref())
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ValidatorRegistry for MemoryRegistry {
    fn validator_keys(&self) -> Box<dyn Iterator<Item = &[u8]> + '_> {
        Box::new(self.validators.keys().map(Vec::as_slice))
    }

    fn validator(&self, key: &[u8]) -> Option<Validator> {
        self.validators.get(key).cloned()
    }
}

impl DelegationRegistry for MemoryRegistry {
    fn delegators(
        &self,
        validator: &ValidatorKey,
    ) -> Box<dyn Iterator<Item = (&[u8], &[Delegation])> + '_> {
        match self.delegations.get(validator.as_ref()) {
            Some(delegators) => Box::new(
                delegators
                    .iter()
                    .map(|(key, dels)| (key.as_slice(), dels.as_slice())),
            ),
            None => Box::new(std::iter::empty()),
        }
    }
}
