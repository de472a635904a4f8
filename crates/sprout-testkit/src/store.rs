use async_trait::async_trait;
use sprout_core::{
    Profile, SubjectId,
    dto::page::Page,
    interface::store::{RecordStore, StoreError},
    storage::{
        condition::Condition,
        memory::MemoryRecordStore,
        record::{FieldValue, ListQuery, ProfileField, ProfilePatch, Projection},
    },
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

///
/// FaultPoint
///
/// Store call a fault is attached to. Seed writes are told apart by the
/// `seed_version` their patch writes: `-1` claims, `0` rolls back, anything
/// above finalizes.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FaultPoint {
    Create,
    Get,
    List,
    /// Any update that does not touch `seed_version`.
    Update,
    SeedVersionWrite(i64),
}

#[derive(Debug)]
struct Fault {
    point: FaultPoint,
    error: StoreError,
    remaining: Option<usize>,
}

///
/// FaultyStore
///
/// Wraps a [`MemoryRecordStore`] and fails chosen calls before they reach it.
/// A failed call has no effect on the stored record.
///

pub struct FaultyStore {
    inner: Arc<MemoryRecordStore>,
    faults: Mutex<Vec<Fault>>,
    competitors: Mutex<Vec<Profile>>,
}

impl FaultyStore {
    #[must_use]
    pub fn new(inner: Arc<MemoryRecordStore>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Vec::new()),
            competitors: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &MemoryRecordStore {
        &self.inner
    }

    /// Fail every matching call until [`Self::clear_faults`].
    pub fn fail(&self, point: FaultPoint, error: StoreError) {
        lock(&self.faults).push(Fault {
            point,
            error,
            remaining: None,
        });
    }

    /// Fail only the next matching call.
    pub fn fail_once(&self, point: FaultPoint, error: StoreError) {
        lock(&self.faults).push(Fault {
            point,
            error,
            remaining: Some(1),
        });
    }

    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    /// Before the next `create`, insert `profile` as if a concurrent caller
    /// had won the race.
    pub fn race_next_create(&self, profile: Profile) {
        lock(&self.competitors).push(profile);
    }

    fn check(&self, point: FaultPoint) -> Result<(), StoreError> {
        let mut faults = lock(&self.faults);
        let Some(index) = faults.iter().position(|f| f.point == point) else {
            return Ok(());
        };

        let error = faults[index].error.clone();
        if let Some(remaining) = faults[index].remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                faults.remove(index);
            }
        }

        Err(error)
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn get(
        &self,
        id: &SubjectId,
        projection: &Projection,
    ) -> Result<Option<Profile>, StoreError> {
        self.check(FaultPoint::Get)?;
        self.inner.get(id, projection).await
    }

    async fn create(&self, profile: Profile) -> Result<Profile, StoreError> {
        self.check(FaultPoint::Create)?;

        let competitor = lock(&self.competitors).pop();
        if let Some(competitor) = competitor {
            self.inner.create(competitor).await?;
        }

        self.inner.create(profile).await
    }

    async fn update(
        &self,
        id: &SubjectId,
        patch: ProfilePatch,
        condition: Option<Condition>,
    ) -> Result<Profile, StoreError> {
        let point = patch
            .fields()
            .get(&ProfileField::SeedVersion)
            .and_then(FieldValue::as_int)
            .map_or(FaultPoint::Update, FaultPoint::SeedVersionWrite);
        self.check(point)?;

        self.inner.update(id, patch, condition).await
    }

    async fn list(
        &self,
        query: &ListQuery,
        projection: &Projection,
    ) -> Result<Page<Profile>, StoreError> {
        self.check(FaultPoint::List)?;
        self.inner.list(query, projection).await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

///
/// TESTS
///
