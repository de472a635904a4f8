//! In-process reference implementation of [`RecordStore`].
//!
//! Conditions are evaluated and patches applied under one mutex, which gives
//! the same single-record compare-and-swap guarantee a remote conditional
//! write offers. Optional strict fields emulate a schema-validating read API
//! that refuses to return rows holding null in a non-nullable field.

use crate::{
    domain::{identity::SubjectId, profile::Profile},
    dto::page::Page,
    interface::store::{RecordStore, StoreError},
    storage::{
        condition::Condition,
        record::{FieldMap, FieldValue, ListQuery, ProfileField, ProfilePatch, Projection},
    },
};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

///
/// WriteRecord
///
/// One conditional write as observed by the store, in commit order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteRecord {
    pub id: SubjectId,
    pub patch: ProfilePatch,
    pub condition: Option<Condition>,
    pub applied: bool,
}

impl WriteRecord {
    /// Seed version written by this update, if it touched one.
    #[must_use]
    pub fn seed_version(&self) -> Option<i64> {
        self.patch
            .fields()
            .get(&ProfileField::SeedVersion)
            .and_then(FieldValue::as_int)
    }
}

#[derive(Default)]
struct MemoryState {
    records: BTreeMap<SubjectId, FieldMap>,
    writes: Vec<WriteRecord>,
}

///
/// MemoryRecordStore
///

#[derive(Default)]
pub struct MemoryRecordStore {
    state: Mutex<MemoryState>,
    strict_fields: BTreeSet<ProfileField>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse reads that would return null for `field` under a projection
    /// that includes it.
    #[must_use]
    pub fn with_strict_field(mut self, field: ProfileField) -> Self {
        self.strict_fields.insert(field);
        self
    }

    /// Insert a raw record, bypassing every check. Used to stage legacy rows.
    pub fn insert_raw(&self, id: impl Into<SubjectId>, record: FieldMap) {
        self.lock().records.insert(id.into(), record);
    }

    #[must_use]
    pub fn raw(&self, id: &SubjectId) -> Option<FieldMap> {
        self.lock().records.get(id).cloned()
    }

    /// Every update attempted so far, applied or not.
    #[must_use]
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    #[must_use]
    pub fn writes_for(&self, id: &SubjectId) -> Vec<WriteRecord> {
        self.lock()
            .writes
            .iter()
            .filter(|w| &w.id == id)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_strict(
        &self,
        record: &FieldMap,
        projection: &Projection,
        path: &str,
    ) -> Result<(), StoreError> {
        for field in &self.strict_fields {
            let is_null = matches!(record.get(field), None | Some(FieldValue::Null));
            if projection.includes(*field) && is_null {
                return Err(StoreError::unclassified(format!(
                    "Cannot return null for non-nullable type: 'String' within parent 'Profile' ({path}/{field})"
                )));
            }
        }

        Ok(())
    }

    fn decode(record: &FieldMap, projection: &Projection) -> Result<Profile, StoreError> {
        Profile::from_fields(record, projection)
            .map_err(|err| StoreError::rejected(format!("stored profile is malformed: {err}")))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(
        &self,
        id: &SubjectId,
        projection: &Projection,
    ) -> Result<Option<Profile>, StoreError> {
        let state = self.lock();
        let Some(record) = state.records.get(id) else {
            return Ok(None);
        };

        self.check_strict(record, projection, "/getProfile")?;
        Self::decode(record, projection).map(Some)
    }

    async fn create(&self, profile: Profile) -> Result<Profile, StoreError> {
        let mut state = self.lock();
        if state.records.contains_key(&profile.id) {
            return Err(StoreError::already_exists(&profile.id));
        }

        state.records.insert(profile.id.clone(), profile.to_fields());

        Ok(profile)
    }

    async fn update(
        &self,
        id: &SubjectId,
        patch: ProfilePatch,
        condition: Option<Condition>,
    ) -> Result<Profile, StoreError> {
        let mut state = self.lock();

        let outcome = match (state.records.get(id), &condition) {
            (None, Some(cond)) => Err(StoreError::condition_failed(id, cond)),
            (None, None) => Err(StoreError::rejected(format!("profile {id} not found"))),
            (Some(record), Some(cond)) if !cond.evaluate(record) => {
                Err(StoreError::condition_failed(id, cond))
            }
            (Some(record), _) => {
                let mut next = record.clone();
                patch.apply_to(&mut next);
                Self::decode(&next, &Projection::full()).map(|profile| (next, profile))
            }
        };

        state.writes.push(WriteRecord {
            id: id.clone(),
            patch,
            condition,
            applied: outcome.is_ok(),
        });

        let (next, profile) = outcome?;
        state.records.insert(id.clone(), next);

        Ok(profile)
    }

    async fn list(
        &self,
        query: &ListQuery,
        projection: &Projection,
    ) -> Result<Page<Profile>, StoreError> {
        let state = self.lock();
        let page_size = usize::try_from(query.page_size.max(1)).unwrap_or(usize::MAX);
        let after = query.cursor.as_deref().map(SubjectId::from);

        let mut matching = state
            .records
            .iter()
            .filter(|(id, _)| after.as_ref().is_none_or(|c| *id > c))
            .filter(|(_, record)| query.filter.matches(record));

        let mut items = Vec::new();
        for (index, (_, record)) in matching.by_ref().take(page_size).enumerate() {
            self.check_strict(record, projection, &format!("/listProfiles/items/{index}"))?;
            items.push(Self::decode(record, projection)?);
        }

        let cursor = if matching.next().is_some() {
            items.last().map(|p| p.id.to_string())
        } else {
            None
        };

        Ok(Page::new(items, cursor))
    }
}

///
/// TESTS
///
