use crate::domain::identity::SubjectId;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// `seed_version` value held while a seed claim is in progress.
pub const SEED_VERSION_CLAIMED: i64 = -1;

/// `seed_version` of a profile that has never been seeded.
pub const SEED_VERSION_NONE: i64 = 0;

///
/// Tier
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    #[display("FREE")]
    Free,
    #[display("PRO")]
    Pro,
    #[display("DEMO")]
    Demo,
}

impl Tier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
            Self::Demo => "DEMO",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FREE" => Some(Self::Free),
            "PRO" => Some(Self::Pro),
            "DEMO" => Some(Self::Demo),
            _ => None,
        }
    }
}

///
/// Profile
///
/// One record per identity. `id` and `owner` are fixed at creation; seed
/// fields are only written by the seed claim state machine; `email` and
/// `display_name` may be missing on legacy records.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Profile {
    pub id: SubjectId,
    pub owner: SubjectId,
    pub tier: Tier,
    pub seed_version: i64,
    pub seeded_at: Option<u64>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: u64,
}

impl Profile {
    /// Build the record written on first bootstrap.
    #[must_use]
    pub fn new_default(
        id: SubjectId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        tier: Tier,
        created_at: u64,
    ) -> Self {
        Self {
            owner: id.clone(),
            id,
            tier,
            seed_version: SEED_VERSION_NONE,
            seeded_at: None,
            email: Some(email.into()),
            display_name: Some(display_name.into()),
            avatar_url: None,
            created_at,
        }
    }

    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.seed_version == SEED_VERSION_CLAIMED
    }
}

///
/// TESTS
///
