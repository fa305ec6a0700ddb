use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// What happens to users that seed-and-grow did not absorb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeftoverPolicy {
    /// Join the smallest group with room left regardless of topic, or found a new one.
    /// Nobody ends up unassigned.
    #[default]
    PlaceAll,
    /// Join the smallest group with room left whose topic the user selected. Without
    /// one the user founds a new group, unless every group is full; then they stay
    /// unassigned.
    TopicMatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorOptions {
    pub leftover_policy: LeftoverPolicy,
    /// Fixes every tie-break and topic choice. Unset means fresh entropy per run.
    pub seed: Option<u64>,
}

impl AllocatorOptions {
    #[must_use]
    pub fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}
