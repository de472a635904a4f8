//! Mechanical profile store operations (no business policy).
//!
//! Each operation is exactly one store request. The conditions built here are
//! the whole synchronization story: the store evaluates them atomically, so
//! no in-process locking is involved.

use crate::{
    domain::{
        identity::SubjectId,
        profile::{Profile, SEED_VERSION_CLAIMED, Tier},
    },
    interface::store::{RecordStore, StoreError, StoreErrorKind},
    ops::classify::classify,
    storage::{
        condition::{
            Condition, all, any, attribute_is_null_type, attribute_not_exists, equals, less_than,
            not_equals,
        },
        record::{FieldValue, ProfileField, ProfilePatch, Projection},
    },
};

///
/// SelfHealOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelfHealOutcome {
    /// Candidate was blank; no request issued.
    Skipped,
    /// Field was missing, null or empty and now holds the candidate.
    Healed(Profile),
    /// Guard did not hold: the field was already set.
    AlreadySet,
}

///
/// ProfileStoreOps
///

pub struct ProfileStoreOps;

impl ProfileStoreOps {
    // -------------------------------------------------------------
    // Reads / creation
    // -------------------------------------------------------------

    pub async fn get(
        store: &dyn RecordStore,
        id: &SubjectId,
        projection: &Projection,
    ) -> Result<Option<Profile>, StoreError> {
        store.get(id, projection).await
    }

    pub async fn create(store: &dyn RecordStore, profile: Profile) -> Result<Profile, StoreError> {
        store.create(profile).await
    }

    // -------------------------------------------------------------
    // Self-heal / tier
    // -------------------------------------------------------------

    /// Fill `field` with `candidate` only if it is missing, null or empty.
    pub async fn self_heal(
        store: &dyn RecordStore,
        id: &SubjectId,
        field: ProfileField,
        candidate: &str,
    ) -> Result<SelfHealOutcome, StoreError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Ok(SelfHealOutcome::Skipped);
        }

        let mut patch = ProfilePatch::new();
        patch = match field {
            ProfileField::Email => patch.email(candidate),
            ProfileField::DisplayName => patch.display_name(candidate),
            ProfileField::AvatarUrl => patch.avatar_url(candidate),
            other => {
                return Err(StoreError::rejected(format!(
                    "field '{other}' cannot be self-healed"
                )));
            }
        };

        match store.update(id, patch, Some(heal_condition(field))).await {
            Ok(profile) => Ok(SelfHealOutcome::Healed(profile)),
            Err(err) if classify(&err) == StoreErrorKind::ConditionFailed => {
                Ok(SelfHealOutcome::AlreadySet)
            }
            Err(err) => Err(err),
        }
    }

    /// Set the tier unless the stored tier is PRO at write time.
    pub async fn reconcile_tier(
        store: &dyn RecordStore,
        id: &SubjectId,
        tier: Tier,
    ) -> Result<Profile, StoreError> {
        let guard = not_equals(ProfileField::Tier, Tier::Pro.into());

        store
            .update(id, ProfilePatch::new().tier(tier), Some(guard))
            .await
    }

    // -------------------------------------------------------------
    // Seed claim transitions
    // -------------------------------------------------------------

    /// NOT_SEEDED → CLAIMED.
    pub async fn claim_seed(
        store: &dyn RecordStore,
        id: &SubjectId,
        current_version: i64,
    ) -> Result<Profile, StoreError> {
        store
            .update(
                id,
                ProfilePatch::new().seed_version(SEED_VERSION_CLAIMED),
                Some(claim_condition(current_version)),
            )
            .await
    }

    /// CLAIMED → SEEDED.
    pub async fn finalize_seed(
        store: &dyn RecordStore,
        id: &SubjectId,
        current_version: i64,
        seeded_at: u64,
    ) -> Result<Profile, StoreError> {
        store
            .update(
                id,
                ProfilePatch::new()
                    .seed_version(current_version)
                    .seeded_at(seeded_at),
                Some(held_claim_condition()),
            )
            .await
    }

    /// CLAIMED → NOT_SEEDED (version 0).
    pub async fn rollback_seed(
        store: &dyn RecordStore,
        id: &SubjectId,
        rollback_version: i64,
    ) -> Result<Profile, StoreError> {
        store
            .update(
                id,
                ProfilePatch::new().seed_version(rollback_version),
                Some(held_claim_condition()),
            )
            .await
    }
}

// -----------------------------------------------------------------------------
// Conditions
// -----------------------------------------------------------------------------

/// Field is missing, null-typed, or the empty string.
#[must_use]
pub fn heal_condition(field: ProfileField) -> Condition {
    any([
        attribute_not_exists(field),
        attribute_is_null_type(field),
        equals(field, FieldValue::str("")),
    ])
}

/// Stored version is below current (or missing or null on a legacy row) and
/// no claim is in progress.
#[must_use]
pub fn claim_condition(current_version: i64) -> Condition {
    all([
        any([
            attribute_not_exists(ProfileField::SeedVersion),
            attribute_is_null_type(ProfileField::SeedVersion),
            less_than(ProfileField::SeedVersion, FieldValue::Int(current_version)),
        ]),
        not_equals(
            ProfileField::SeedVersion,
            FieldValue::Int(SEED_VERSION_CLAIMED),
        ),
    ])
}

/// A claim is held (stored version is the claim marker).
#[must_use]
pub fn held_claim_condition() -> Condition {
    equals(
        ProfileField::SeedVersion,
        FieldValue::Int(SEED_VERSION_CLAIMED),
    )
}

///
/// TESTS
///
