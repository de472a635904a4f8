//! Test utilities and fixtures for exercising Sprout workflows.
//!
//! Provides scripted collaborators (identity provider, seed generator and a
//! fault-injecting store wrapper) plus deterministic dummy identities.

pub mod identity;
pub mod seed;
pub mod store;

pub use identity::ScriptedIdentity;
pub use seed::{RecordingSeeder, SeedBehavior, cancel_on_poll};
pub use store::{FaultPoint, FaultyStore};

use sprout_core::{Identity, IdentityAttributes, SessionClaims, SubjectId};

///
/// Deterministic dummy-value generator for tests.
///
/// Produces stable identities derived from a numeric seed, which keeps tests
/// reproducible without hardcoding ids and addresses everywhere.
///

pub struct Fake;

impl Fake {
    #[must_use]
    pub fn subject(seed: u32) -> SubjectId {
        SubjectId::new(format!("sub-{seed:08x}"))
    }

    #[must_use]
    pub fn identity(seed: u32) -> Identity {
        Identity::new(Self::subject(seed), format!("user{seed}"))
    }

    /// Identity whose username carries the default demo prefix.
    #[must_use]
    pub fn demo_identity(seed: u32) -> Identity {
        Identity::new(Self::subject(seed), format!("demo-user{seed}"))
    }

    #[must_use]
    pub fn attributes(seed: u32) -> IdentityAttributes {
        IdentityAttributes {
            email: Some(format!("user{seed}@example.com")),
            name: Some(format!("User {seed}")),
            preferred_username: None,
        }
    }

    #[must_use]
    pub fn claims(groups: &[&str], role: Option<&str>) -> SessionClaims {
        SessionClaims {
            groups: groups.iter().map(ToString::to_string).collect(),
            role: role.map(str::to_string),
        }
    }
}

///
/// TESTS
///
