use crate::domain::seed::SeedState;

///
/// SeedPlan
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeedPlan {
    /// Already at or above the current version; no claim is attempted.
    Skip,
    /// Attempt a claim. The store decides whether it holds; a locally
    /// observed claim marker may be stale.
    Claim(SeedState),
}

/// Decide whether a bootstrap should try to claim the seed.
#[must_use]
pub const fn plan_seed(seed_version: i64, current_version: i64) -> SeedPlan {
    match SeedState::classify(seed_version, current_version) {
        SeedState::Seeded => SeedPlan::Skip,
        state => SeedPlan::Claim(state),
    }
}

///
/// TESTS
///
