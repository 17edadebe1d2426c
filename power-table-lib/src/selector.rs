use crate::key::ValidatorKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub key: ValidatorKey,
    pub voting_power: u64,
}

/// Picks the active set among the candidates of a height.
///
/// Implementations must be deterministic, including on ties, since every node
/// has to end up with the very same set.
pub trait TopNSelector {
    fn select(&self, candidates: Vec<Candidate>, n: usize) -> Vec<Candidate>;
}

/// Highest voting power first; ties go to the smallest key.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopByPower;

impl TopNSelector for TopByPower {
    fn select(&self, mut candidates: Vec<Candidate>, n: usize) -> Vec<Candidate> {
        candidates.sort_by(|a, b| {
            b.voting_power
                .cmp(&a.voting_power)
                .then_with(|| a.key.cmp(&b.key))
        });
        candidates.truncate(n);
        candidates
    }
}
