use crate::{
    domain::{identity::SubjectId, profile::Profile},
    dto::page::Page,
    storage::{
        condition::Condition,
        record::{ListQuery, ProfileField, ProfilePatch, Projection},
    },
};
use async_trait::async_trait;
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// StoreErrorKind
///
/// Structured failure kinds at the store boundary. Transports without error
/// codes report `Unclassified` and leave classification to the message
/// adapter in `ops::classify`.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum StoreErrorKind {
    AlreadyExists,
    ConditionFailed,
    Rejected,
    #[display("SchemaNullabilityViolation({field})")]
    SchemaNullabilityViolation {
        field: ProfileField,
    },
    Unavailable,
    Unclassified,
}

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn already_exists(id: &SubjectId) -> Self {
        Self::new(
            StoreErrorKind::AlreadyExists,
            format!("profile {id} already exists"),
        )
    }

    #[must_use]
    pub fn condition_failed(id: &SubjectId, condition: &Condition) -> Self {
        Self::new(
            StoreErrorKind::ConditionFailed,
            format!("conditional update on profile {id} failed: {condition}"),
        )
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Rejected, message)
    }

    /// Error raised by a transport that carries only a message.
    #[must_use]
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unclassified, message)
    }

    #[must_use]
    pub const fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

///
/// RecordStore
///
/// Durable profile store offering single-record conditional writes.
///
/// Contract:
/// - `create` fails with `AlreadyExists` when a record with the same id exists.
/// - `update` evaluates `condition` atomically against the stored record and
///   fails with `ConditionFailed` when it does not hold. Updating a missing
///   record is a condition failure when a condition is given, `Rejected`
///   otherwise.
/// - `list` pages are ordered by id; `cursor` is opaque to callers.
///

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(
        &self,
        id: &SubjectId,
        projection: &Projection,
    ) -> Result<Option<Profile>, StoreError>;

    async fn create(&self, profile: Profile) -> Result<Profile, StoreError>;

    async fn update(
        &self,
        id: &SubjectId,
        patch: ProfilePatch,
        condition: Option<Condition>,
    ) -> Result<Profile, StoreError>;

    async fn list(
        &self,
        query: &ListQuery,
        projection: &Projection,
    ) -> Result<Page<Profile>, StoreError>;
}
