use crate::domain::profile::SEED_VERSION_CLAIMED;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// SeedState
///
/// Position of a profile in the seed claim state machine for a given current
/// seed version. Values at or above the current version count as seeded.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum SeedState {
    NotSeeded,
    Claimed,
    Seeded,
    /// Negative value other than the claim marker.
    Invalid,
}

impl SeedState {
    #[must_use]
    pub const fn classify(seed_version: i64, current_version: i64) -> Self {
        if seed_version == SEED_VERSION_CLAIMED {
            Self::Claimed
        } else if seed_version < 0 {
            Self::Invalid
        } else if seed_version >= current_version {
            Self::Seeded
        } else {
            Self::NotSeeded
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Seeded)
    }
}

///
/// TESTS
///
