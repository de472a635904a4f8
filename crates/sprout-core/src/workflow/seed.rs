//! Seed claim coordination: at most one seed per identity and seed version.
//!
//! State machine over `seed_version`:
//!
//! ```text
//!   NOT_SEEDED ──claim──▶ CLAIMED ──finalize──▶ SEEDED
//!        ▲                   │
//!        └─────rollback──────┘   (populate failed or cancelled)
//! ```
//!
//! Every transition is one conditional write. Losing the claim is a normal
//! outcome, not an error, and is never retried: the winner either has
//! finished or will finish the seed. A failed rollback leaves the profile
//! CLAIMED; that blocks any further seeding until an operator releases it.

use crate::{
    config::{ConfigModel, schema::ROLLBACK_SEED_VERSION},
    domain::{identity::SubjectId, profile::Profile, seed::SeedState},
    interface::{
        seed::{SeedError, SeedGenerator},
        store::{RecordStore, StoreErrorKind},
    },
    ops::{classify::classify, clock::ClockOps, profile::ProfileStoreOps},
    policy::seed::{SeedPlan, plan_seed},
    workflow::prelude::*,
};
use futures::{
    FutureExt,
    future::{Either, select},
};
use std::{
    collections::BTreeSet,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error as ThisError;

///
/// SeedWorkflowError
///

#[derive(Debug, ThisError)]
pub enum SeedWorkflowError {
    #[error(transparent)]
    Populate(#[from] SeedError),

    #[error("seed populate for profile {0} was cancelled")]
    Cancelled(SubjectId),
}

impl From<SeedWorkflowError> for InternalError {
    fn from(err: SeedWorkflowError) -> Self {
        match err {
            SeedWorkflowError::Populate(_) => {
                Self::seed(InternalErrorOrigin::Workflow, err.to_string())
            }
            SeedWorkflowError::Cancelled(_) => {
                Self::cancelled(InternalErrorOrigin::Workflow, err.to_string())
            }
        }
    }
}

///
/// SeedOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SeedOutcome {
    /// Profile was already at or above the current version; no claim issued.
    AlreadySeeded,
    /// Another context holds or held the claim.
    LostRace,
    Seeded(Profile),
}

impl SeedOutcome {
    #[must_use]
    pub const fn did_seed(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }
}

///
/// OrphanedClaims
///
/// Claims this process acquired whose bootstrap future was dropped before
/// finalize or rollback ran. They are rolled back on the next flush.
///

#[derive(Default)]
struct OrphanedClaims(Mutex<BTreeSet<SubjectId>>);

impl OrphanedClaims {
    fn insert(&self, id: SubjectId) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    fn take_all(&self) -> BTreeSet<SubjectId> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn snapshot(&self) -> Vec<SubjectId> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

///
/// ClaimGuard
///
/// Armed while this process holds a claim. Dropping it armed records the
/// claim as orphaned.
///

struct ClaimGuard<'a> {
    id: Option<SubjectId>,
    orphans: &'a OrphanedClaims,
}

impl<'a> ClaimGuard<'a> {
    fn arm(id: SubjectId, orphans: &'a OrphanedClaims) -> Self {
        Self {
            id: Some(id),
            orphans,
        }
    }

    fn disarm(mut self) {
        self.id = None;
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            log!(
                Topic::Seed,
                Warn,
                "profile {id}: seed claim abandoned mid-flight; queued for rollback"
            );
            self.orphans.insert(id);
        }
    }
}

///
/// SeedClaimCoordinator
///

pub struct SeedClaimCoordinator {
    store: Arc<dyn RecordStore>,
    seeder: Arc<dyn SeedGenerator>,
    current_version: i64,
    orphans: OrphanedClaims,
}

impl SeedClaimCoordinator {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        seeder: Arc<dyn SeedGenerator>,
        config: &ConfigModel,
    ) -> Self {
        Self {
            store,
            seeder,
            current_version: config.seed.current_version,
            orphans: OrphanedClaims::default(),
        }
    }

    /// Seed `profile` if it is behind the current version.
    pub async fn seed(&self, profile: &Profile) -> Result<SeedOutcome, InternalError> {
        self.seed_until(profile, futures::future::pending::<()>())
            .await
    }

    /// Seed `profile`, treating completion of `cancel` during populate as a
    /// populate failure. The claim is rolled back before returning.
    ///
    /// A `cancel` that has already completed when this is called stops the
    /// seed before any claim is issued. Once populate runs, `cancel` is polled
    /// ahead of the generator, so it wins when both are ready.
    pub async fn seed_until<C>(
        &self,
        profile: &Profile,
        cancel: C,
    ) -> Result<SeedOutcome, InternalError>
    where
        C: Future<Output = ()>,
    {
        // ---------------------------------------------------------------------
        // Plan
        // ---------------------------------------------------------------------

        let state = match plan_seed(profile.seed_version, self.current_version) {
            SeedPlan::Skip => return Ok(SeedOutcome::AlreadySeeded),
            SeedPlan::Claim(state) => state,
        };
        if state == SeedState::Invalid {
            log!(
                Topic::Seed,
                Warn,
                "profile {}: invalid seed_version {}; attempting claim",
                profile.id,
                profile.seed_version
            );
        }

        let mut cancel = Box::pin(cancel);
        if (&mut cancel).now_or_never().is_some() {
            log!(
                Topic::Seed,
                Info,
                "profile {}: cancelled before claim",
                profile.id
            );
            return Err(SeedWorkflowError::Cancelled(profile.id.clone()).into());
        }

        // ---------------------------------------------------------------------
        // Claim
        // ---------------------------------------------------------------------

        let claimed =
            match ProfileStoreOps::claim_seed(self.store.as_ref(), &profile.id, self.current_version)
                .await
            {
                Ok(claimed) => claimed,
                Err(err) if classify(&err) == StoreErrorKind::ConditionFailed => {
                    log!(
                        Topic::Seed,
                        Info,
                        "profile {}: seed claim held elsewhere (observed {state})",
                        profile.id
                    );
                    return Ok(SeedOutcome::LostRace);
                }
                Err(err) => return Err(err.into()),
            };
        let guard = ClaimGuard::arm(claimed.id.clone(), &self.orphans);

        // ---------------------------------------------------------------------
        // Populate
        // ---------------------------------------------------------------------

        if let Err(err) = self.populate(&claimed, cancel).await {
            log!(Topic::Seed, Warn, "profile {}: {err}; rolling back", claimed.id);
            self.rollback(&claimed.id).await;
            guard.disarm();

            return Err(err.into());
        }

        // ---------------------------------------------------------------------
        // Finalize
        // ---------------------------------------------------------------------

        let finalized = ProfileStoreOps::finalize_seed(
            self.store.as_ref(),
            &claimed.id,
            self.current_version,
            ClockOps::now_secs(),
        )
        .await;
        guard.disarm();

        match finalized {
            Ok(seeded) => {
                log!(
                    Topic::Seed,
                    Ok,
                    "profile {}: seeded to version {}",
                    seeded.id,
                    seeded.seed_version
                );
                Ok(SeedOutcome::Seeded(seeded))
            }
            Err(err) => {
                log!(
                    Topic::Seed,
                    Error,
                    "profile {}: seed finalize failed, claim state unknown: {err}",
                    claimed.id
                );
                Err(err.into())
            }
        }
    }

    /// Roll back every orphaned claim. Returns how many were attempted.
    pub async fn flush_orphaned_claims(&self) -> usize {
        let orphans = self.orphans.take_all();
        for id in &orphans {
            self.rollback(id).await;
        }

        orphans.len()
    }

    #[must_use]
    pub fn orphaned_claims(&self) -> Vec<SubjectId> {
        self.orphans.snapshot()
    }

    async fn populate<C>(&self, profile: &Profile, cancel: C) -> Result<(), SeedWorkflowError>
    where
        C: Future<Output = ()> + Unpin,
    {
        let generate = self.seeder.generate(profile);

        match select(cancel, generate).await {
            Either::Left(((), _)) => Err(SeedWorkflowError::Cancelled(profile.id.clone())),
            Either::Right((result, _)) => result.map_err(SeedWorkflowError::from),
        }
    }

    // Best-effort: failures are logged, never returned.
    async fn rollback(&self, id: &SubjectId) {
        match ProfileStoreOps::rollback_seed(self.store.as_ref(), id, ROLLBACK_SEED_VERSION).await {
            Ok(_) => {
                log!(Topic::Seed, Info, "profile {id}: seed claim rolled back");
            }
            Err(err) if classify(&err) == StoreErrorKind::ConditionFailed => {
                log!(
                    Topic::Seed,
                    Warn,
                    "profile {id}: rollback skipped, claim no longer held: {err}"
                );
            }
            Err(err) => {
                log!(
                    Topic::Seed,
                    Error,
                    "profile {id}: rollback failed, profile stays claimed until released: {err}"
                );
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        InternalErrorClass,
        domain::profile::{SEED_VERSION_CLAIMED, Tier},
        storage::{
            memory::MemoryRecordStore,
            record::{ProfilePatch, Projection},
        },
    };
    use async_trait::async_trait;
    use futures::{
        executor::block_on,
        future::{poll_fn, ready},
    };
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        task::Poll,
    };

    enum Mode {
        Succeed,
        Fail,
        Hang,
    }

    struct StubSeeder {
        mode: Mode,
        calls: AtomicUsize,
    }

    impl StubSeeder {
        fn new(mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SeedGenerator for StubSeeder {
        async fn generate(&self, _: &Profile) -> Result<(), SeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                Mode::Succeed => Ok(()),
                Mode::Fail => Err(SeedError::new("content service down")),
                Mode::Hang => futures::future::pending().await,
            }
        }
    }

    type Fixture = (
        Arc<MemoryRecordStore>,
        Arc<StubSeeder>,
        SeedClaimCoordinator,
        Profile,
    );

    fn setup(mode: Mode) -> Fixture {
        let store = Arc::new(MemoryRecordStore::new());
        let profile = block_on(store.create(Profile::new_default(
            "u1".into(),
            "a@x.com",
            "a",
            Tier::Free,
            1,
        )))
        .unwrap();
        let seeder = StubSeeder::new(mode);
        let coordinator =
            SeedClaimCoordinator::new(store.clone(), seeder.clone(), &ConfigModel::default());

        (store, seeder, coordinator, profile)
    }

    fn stored_version(store: &MemoryRecordStore) -> i64 {
        block_on(store.get(&"u1".into(), &Projection::full()))
            .unwrap()
            .unwrap()
            .seed_version
    }

    fn written_versions(store: &MemoryRecordStore) -> Vec<(Option<i64>, bool)> {
        store
            .writes_for(&"u1".into())
            .iter()
            .map(|w| (w.seed_version(), w.applied))
            .collect()
    }

    #[test]
    fn seed_passes_through_claim_and_runs_once() {
        let (store, seeder, coordinator, profile) = setup(Mode::Succeed);

        let outcome = block_on(coordinator.seed(&profile)).unwrap();
        let SeedOutcome::Seeded(seeded) = outcome else {
            panic!("expected a seed");
        };
        assert_eq!(seeded.seed_version, 1);
        assert!(seeded.seeded_at.is_some());
        assert_eq!(
            written_versions(&store),
            vec![(Some(SEED_VERSION_CLAIMED), true), (Some(1), true)]
        );

        // fresh snapshot skips; a stale one loses the claim
        assert_eq!(
            block_on(coordinator.seed(&seeded)).unwrap(),
            SeedOutcome::AlreadySeeded
        );
        assert_eq!(
            block_on(coordinator.seed(&profile)).unwrap(),
            SeedOutcome::LostRace
        );
        assert_eq!(seeder.calls(), 1);
    }

    #[test]
    fn populate_failure_rolls_back_to_not_seeded() {
        let (store, _, coordinator, profile) = setup(Mode::Fail);

        let err = block_on(coordinator.seed(&profile)).unwrap_err();

        assert_eq!(err.class(), InternalErrorClass::Seed);
        assert!(err.message().contains("content service down"));
        assert_eq!(stored_version(&store), ROLLBACK_SEED_VERSION);
        assert_eq!(
            written_versions(&store),
            vec![(Some(SEED_VERSION_CLAIMED), true), (Some(0), true)]
        );
    }

    // Pending until its `n`th poll. The first poll is the pre-claim check.
    fn cancel_on_poll(n: usize) -> impl Future<Output = ()> {
        let mut polls = 0;
        poll_fn(move |cx| {
            polls += 1;
            if polls >= n {
                Poll::Ready(())
            } else {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
    }

    #[test]
    fn cancelled_populate_rolls_back() {
        let (store, seeder, coordinator, profile) = setup(Mode::Hang);

        let err = block_on(coordinator.seed_until(&profile, cancel_on_poll(3))).unwrap_err();

        assert_eq!(err.class(), InternalErrorClass::Cancelled);
        assert_eq!(seeder.calls(), 1);
        assert_eq!(stored_version(&store), ROLLBACK_SEED_VERSION);
        assert!(coordinator.orphaned_claims().is_empty());
    }

    #[test]
    fn cancel_before_claim_issues_no_writes() {
        let (store, seeder, coordinator, profile) = setup(Mode::Succeed);

        let err = block_on(coordinator.seed_until(&profile, ready(()))).unwrap_err();

        assert_eq!(err.class(), InternalErrorClass::Cancelled);
        assert_eq!(seeder.calls(), 0);
        assert!(written_versions(&store).is_empty());
        assert_eq!(stored_version(&store), 0);
    }

    #[test]
    fn cancel_wins_over_a_ready_generator() {
        let (store, seeder, coordinator, profile) = setup(Mode::Succeed);

        let err = block_on(coordinator.seed_until(&profile, cancel_on_poll(2))).unwrap_err();

        assert_eq!(err.class(), InternalErrorClass::Cancelled);
        assert_eq!(seeder.calls(), 0);
        assert_eq!(
            written_versions(&store),
            vec![(Some(SEED_VERSION_CLAIMED), true), (Some(0), true)]
        );
    }

    #[test]
    fn dropped_seed_leaves_orphan_until_flushed() {
        let (store, _, coordinator, profile) = setup(Mode::Hang);

        assert!(coordinator.seed(&profile).now_or_never().is_none());

        assert_eq!(stored_version(&store), SEED_VERSION_CLAIMED);
        assert_eq!(coordinator.orphaned_claims(), vec![SubjectId::from("u1")]);

        assert_eq!(block_on(coordinator.flush_orphaned_claims()), 1);
        assert_eq!(stored_version(&store), ROLLBACK_SEED_VERSION);
        assert!(coordinator.orphaned_claims().is_empty());
        assert_eq!(block_on(coordinator.flush_orphaned_claims()), 0);
    }

    #[test]
    fn invalid_versions_are_reclaimed() {
        let (store, _, coordinator, mut profile) = setup(Mode::Succeed);
        block_on(store.update(
            &profile.id,
            ProfilePatch::new().seed_version(-7),
            None,
        ))
        .unwrap();
        profile.seed_version = -7;

        let outcome = block_on(coordinator.seed(&profile)).unwrap();

        assert!(outcome.did_seed());
        assert_eq!(stored_version(&store), 1);
    }
}
