//! Field-level record model shared by conditions, patches and stores.
//!
//! Stores see a profile as a map of named fields. A field can be absent, hold
//! an explicit null, or hold a value; conditions distinguish all three.

use crate::domain::{
    identity::SubjectId,
    profile::{Profile, SEED_VERSION_NONE, Tier},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

pub type FieldMap = BTreeMap<ProfileField, FieldValue>;

///
/// ProfileField
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum ProfileField {
    #[display("avatarUrl")]
    AvatarUrl,
    #[display("createdAt")]
    CreatedAt,
    #[display("displayName")]
    DisplayName,
    #[display("email")]
    Email,
    #[display("id")]
    Id,
    #[display("owner")]
    Owner,
    #[display("seededAt")]
    SeededAt,
    #[display("seedVersion")]
    SeedVersion,
    #[display("tier")]
    Tier,
}

impl ProfileField {
    pub const ALL: [Self; 9] = [
        Self::AvatarUrl,
        Self::CreatedAt,
        Self::DisplayName,
        Self::Email,
        Self::Id,
        Self::Owner,
        Self::SeedVersion,
        Self::SeededAt,
        Self::Tier,
    ];

    /// Wire name of the field on the profile entity.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AvatarUrl => "avatarUrl",
            Self::CreatedAt => "createdAt",
            Self::DisplayName => "displayName",
            Self::Email => "email",
            Self::Id => "id",
            Self::Owner => "owner",
            Self::SeedVersion => "seedVersion",
            Self::SeededAt => "seededAt",
            Self::Tier => "tier",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Fields only this crate may write; never taken from client payloads.
    #[must_use]
    pub const fn is_server_managed(self) -> bool {
        matches!(
            self,
            Self::CreatedAt
                | Self::Id
                | Self::Owner
                | Self::SeedVersion
                | Self::SeededAt
                | Self::Tier
        )
    }
}

///
/// FieldValue
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldValue {
    Null,
    Int(i64),
    Str(String),
}

impl FieldValue {
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    #[must_use]
    pub fn timestamp(secs: u64) -> Self {
        Self::Int(i64::try_from(secs).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Tier> for FieldValue {
    fn from(tier: Tier) -> Self {
        Self::str(tier.as_str())
    }
}

///
/// RecordError
///

#[derive(Debug, ThisError)]
pub enum RecordError {
    #[error("record is missing required field '{0}'")]
    MissingField(ProfileField),

    #[error("record field '{field}' has unexpected value {value:?}")]
    InvalidField {
        field: ProfileField,
        value: FieldValue,
    },
}

///
/// Projection
///
/// Set of fields a read returns. The full projection returns everything; a
/// reduced projection omits fields known to violate the schema on some rows.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Projection {
    omitted: BTreeSet<ProfileField>,
}

impl Projection {
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn without(field: ProfileField) -> Self {
        Self {
            omitted: BTreeSet::from([field]),
        }
    }

    #[must_use]
    pub fn includes(&self, field: ProfileField) -> bool {
        !self.omitted.contains(&field)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.omitted.is_empty()
    }
}

///
/// ProfilePatch
///
/// Partial update payload. No setter exists for `id` or `owner`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfilePatch {
    fields: FieldMap,
}

impl ProfilePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn email(self, email: impl Into<String>) -> Self {
        self.set(ProfileField::Email, FieldValue::str(email))
    }

    #[must_use]
    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.set(ProfileField::DisplayName, FieldValue::str(name))
    }

    #[must_use]
    pub fn avatar_url(self, url: impl Into<String>) -> Self {
        self.set(ProfileField::AvatarUrl, FieldValue::str(url))
    }

    #[must_use]
    pub fn tier(self, tier: Tier) -> Self {
        self.set(ProfileField::Tier, tier.into())
    }

    #[must_use]
    pub fn seed_version(self, version: i64) -> Self {
        self.set(ProfileField::SeedVersion, FieldValue::Int(version))
    }

    #[must_use]
    pub fn seeded_at(self, secs: u64) -> Self {
        self.set(ProfileField::SeededAt, FieldValue::timestamp(secs))
    }

    /// Build a patch from an untrusted client payload.
    ///
    /// Only descriptive fields survive; server-managed and unknown field names
    /// are returned separately so the caller can report them.
    #[must_use]
    pub fn from_client(update: ClientProfileUpdate) -> (Self, Vec<String>) {
        let mut patch = Self::new();
        let mut rejected = Vec::new();

        for (name, value) in update.fields {
            match ProfileField::parse(&name) {
                Some(field) if !field.is_server_managed() => {
                    patch = patch.set(field, value);
                }
                _ => rejected.push(name),
            }
        }

        (patch, rejected)
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldMap {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply the patch on top of a stored record.
    pub fn apply_to(&self, record: &mut FieldMap) {
        for (field, value) in &self.fields {
            record.insert(*field, value.clone());
        }
    }

    fn set(mut self, field: ProfileField, value: FieldValue) -> Self {
        self.fields.insert(field, value);
        self
    }
}

///
/// ClientProfileUpdate
///
/// Raw update payload as received from a client, keyed by wire field name.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClientProfileUpdate {
    pub fields: BTreeMap<String, FieldValue>,
}

///
/// ProfileFilter
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileFilter {
    pub tier: Option<Tier>,
    pub owner: Option<SubjectId>,
}

impl ProfileFilter {
    #[must_use]
    pub fn matches(&self, record: &FieldMap) -> bool {
        let tier_ok = self.tier.is_none_or(|tier| {
            record.get(&ProfileField::Tier) == Some(&FieldValue::from(tier))
        });
        let owner_ok = self.owner.as_ref().is_none_or(|owner| {
            record.get(&ProfileField::Owner) == Some(&FieldValue::str(owner.as_str()))
        });

        tier_ok && owner_ok
    }
}

///
/// ListQuery
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListQuery {
    pub filter: ProfileFilter,
    pub cursor: Option<String>,
    pub page_size: u32,
}

// -----------------------------------------------------------------------------
// Profile <-> FieldMap
// -----------------------------------------------------------------------------

impl Profile {
    /// Encode as a stored record. Absent optionals are omitted, not nulled.
    #[must_use]
    pub fn to_fields(&self) -> FieldMap {
        let mut record = FieldMap::new();
        record.insert(ProfileField::Id, FieldValue::str(self.id.as_str()));
        record.insert(ProfileField::Owner, FieldValue::str(self.owner.as_str()));
        record.insert(ProfileField::Tier, self.tier.into());
        record.insert(ProfileField::SeedVersion, FieldValue::Int(self.seed_version));
        record.insert(ProfileField::CreatedAt, FieldValue::timestamp(self.created_at));

        if let Some(at) = self.seeded_at {
            record.insert(ProfileField::SeededAt, FieldValue::timestamp(at));
        }
        for (field, value) in [
            (ProfileField::Email, &self.email),
            (ProfileField::DisplayName, &self.display_name),
            (ProfileField::AvatarUrl, &self.avatar_url),
        ] {
            if let Some(v) = value {
                record.insert(field, FieldValue::str(v.as_str()));
            }
        }

        record
    }

    /// Decode a stored record, tolerating legacy gaps.
    ///
    /// Rows that predate tiers or seeding decode as `FREE` and unseeded.
    /// Fields outside `projection` decode as absent.
    pub fn from_fields(record: &FieldMap, projection: &Projection) -> Result<Self, RecordError> {
        let id = required_str(record, ProfileField::Id)?;
        let owner = required_str(record, ProfileField::Owner)?;

        let tier = match record.get(&ProfileField::Tier) {
            None | Some(FieldValue::Null) => Tier::Free,
            Some(value) => value
                .as_str()
                .and_then(Tier::parse)
                .ok_or_else(|| invalid(ProfileField::Tier, value))?,
        };

        let seed_version = match record.get(&ProfileField::SeedVersion) {
            None | Some(FieldValue::Null) => SEED_VERSION_NONE,
            Some(value) => value
                .as_int()
                .ok_or_else(|| invalid(ProfileField::SeedVersion, value))?,
        };

        let optional_str = |field: ProfileField| {
            if !projection.includes(field) {
                return None;
            }
            record
                .get(&field)
                .and_then(FieldValue::as_str)
                .map(str::to_string)
        };
        let optional_ts = |field: ProfileField| {
            record
                .get(&field)
                .and_then(FieldValue::as_int)
                .and_then(|v| u64::try_from(v).ok())
        };

        Ok(Self {
            id: SubjectId::new(id),
            owner: SubjectId::new(owner),
            tier,
            seed_version,
            seeded_at: optional_ts(ProfileField::SeededAt),
            email: optional_str(ProfileField::Email),
            display_name: optional_str(ProfileField::DisplayName),
            avatar_url: optional_str(ProfileField::AvatarUrl),
            created_at: optional_ts(ProfileField::CreatedAt).unwrap_or_default(),
        })
    }
}

fn required_str(record: &FieldMap, field: ProfileField) -> Result<String, RecordError> {
    match record.get(&field) {
        Some(FieldValue::Str(v)) if !v.is_empty() => Ok(v.clone()),
        Some(other) => Err(invalid(field, other)),
        None => Err(RecordError::MissingField(field)),
    }
}

fn invalid(field: ProfileField, value: &FieldValue) -> RecordError {
    RecordError::InvalidField {
        field,
        value: value.clone(),
    }
}

///
/// TESTS
///
