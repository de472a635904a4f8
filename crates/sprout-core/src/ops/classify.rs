//! Store error classification.
//!
//! Structured kinds reported by the store always win. Message matching is a
//! last-resort adapter for transports that only carry error text.

use crate::{
    InternalError,
    interface::store::{StoreError, StoreErrorKind},
    storage::record::ProfileField,
};

const NULLABILITY_MARKERS: [&str; 2] = ["non-nullable", "non-null type"];
const CONDITION_MARKERS: [&str; 2] = ["conditionalcheckfailed", "conditional request failed"];
const ALREADY_EXISTS_MARKERS: [&str; 1] = ["already exists"];
const UNAVAILABLE_MARKERS: [&str; 3] = ["throttl", "timed out", "service unavailable"];

// Fields a read can legitimately find null on legacy rows.
const NULLABLE_LEGACY_FIELDS: [ProfileField; 4] = [
    ProfileField::AvatarUrl,
    ProfileField::DisplayName,
    ProfileField::Email,
    ProfileField::SeededAt,
];

/// Resolve the effective kind of a store error.
#[must_use]
pub fn classify(err: &StoreError) -> StoreErrorKind {
    match err.kind() {
        StoreErrorKind::Unclassified => classify_message(err.message()),
        kind => kind,
    }
}

/// Classify an error from its message text alone.
#[must_use]
pub fn classify_message(message: &str) -> StoreErrorKind {
    let lower = message.to_ascii_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if has_nullability_marker(message)
        && let Some(field) = NULLABLE_LEGACY_FIELDS
            .into_iter()
            .find(|f| mentions_field(message, *f))
    {
        return StoreErrorKind::SchemaNullabilityViolation { field };
    }

    if has(&CONDITION_MARKERS) {
        StoreErrorKind::ConditionFailed
    } else if has(&ALREADY_EXISTS_MARKERS) {
        StoreErrorKind::AlreadyExists
    } else if has(&UNAVAILABLE_MARKERS) {
        StoreErrorKind::Unavailable
    } else {
        StoreErrorKind::Unclassified
    }
}

/// True only when the error is a nullability violation on `field`.
///
/// Both the nullability marker and the field name must be present; either one
/// alone is not enough to reclassify the error. Text-only errors are matched
/// per field, so one message naming several null fields counts for each.
#[must_use]
pub fn is_nullability_violation(err: &StoreError, field: ProfileField) -> bool {
    match err.kind() {
        StoreErrorKind::Unclassified => {
            has_nullability_marker(err.message()) && mentions_field(err.message(), field)
        }
        kind => kind == StoreErrorKind::SchemaNullabilityViolation { field },
    }
}

fn has_nullability_marker(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();

    NULLABILITY_MARKERS.iter().any(|m| lower.contains(m))
}

/// A losing compare-and-swap. Create conflicts on conditional-put transports
/// surface as condition failures too.
#[must_use]
pub const fn is_race_loss(kind: StoreErrorKind) -> bool {
    matches!(
        kind,
        StoreErrorKind::ConditionFailed | StoreErrorKind::AlreadyExists
    )
}

/// Whether `message` names `field` as a standalone token (`/email`, `'email'`),
/// not as part of a longer identifier such as `emailVerified`.
#[must_use]
pub fn mentions_field(message: &str, field: ProfileField) -> bool {
    let name = field.name();
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';

    message.match_indices(name).any(|(start, _)| {
        let before = message[..start].chars().next_back();
        let after = message[start + name.len()..].chars().next();

        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self::store(classify(&err), err.to_string())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_kind_wins_over_message() {
        let err = StoreError::rejected("non-nullable email");

        assert_eq!(classify(&err), StoreErrorKind::Rejected);
    }

    #[test]
    fn message_adapter_classifies_transport_errors() {
        let cases = [
            (
                "Cannot return null for non-nullable type: 'AWSEmail' within parent 'Profile' (/listProfiles/items/3/email)",
                StoreErrorKind::SchemaNullabilityViolation {
                    field: ProfileField::Email,
                },
            ),
            (
                "The conditional request failed (Service: DynamoDb, Status Code: 400)",
                StoreErrorKind::ConditionFailed,
            ),
            (
                "DynamoDB:ConditionalCheckFailedException",
                StoreErrorKind::ConditionFailed,
            ),
            ("item already exists", StoreErrorKind::AlreadyExists),
            ("Rate exceeded: request throttled", StoreErrorKind::Unavailable),
            ("socket hang up", StoreErrorKind::Unclassified),
        ];

        for (message, expected) in cases {
            assert_eq!(classify_message(message), expected, "{message}");
        }
    }

    #[test]
    fn nullability_requires_marker_and_field() {
        struct Case {
            name: &'static str,
            message: &'static str,
            expected: bool,
        }

        let cases = [
            Case {
                name: "marker and field",
                message: "Cannot return null for non-nullable type within parent 'Profile' (/getProfile/email)",
                expected: true,
            },
            Case {
                name: "marker without field",
                message: "Cannot return null for non-nullable type within parent 'Profile' (/getProfile/owner)",
                expected: false,
            },
            Case {
                name: "field without marker",
                message: "invalid email address",
                expected: false,
            },
            Case {
                name: "field only as prefix of longer name",
                message: "Cannot return null for non-nullable type (/getProfile/emailVerified)",
                expected: false,
            },
            Case {
                name: "different nullable field",
                message: "Cannot return null for non-nullable type (/getProfile/displayName)",
                expected: false,
            },
            Case {
                name: "aggregated message naming another field first",
                message: "Cannot return null for non-nullable type: 'String' within parent 'Profile' (/getProfile/displayName); Cannot return null for non-nullable type: 'AWSEmail' within parent 'Profile' (/getProfile/email)",
                expected: true,
            },
        ];

        for case in cases {
            let err = StoreError::unclassified(case.message);
            assert_eq!(
                is_nullability_violation(&err, ProfileField::Email),
                case.expected,
                "{}",
                case.name
            );
        }
    }

    #[test]
    fn structured_nullability_kind_matches_its_field_only() {
        let err = StoreError::new(
            StoreErrorKind::SchemaNullabilityViolation {
                field: ProfileField::DisplayName,
            },
            "non-nullable (/getProfile/email)",
        );

        assert!(is_nullability_violation(&err, ProfileField::DisplayName));
        assert!(!is_nullability_violation(&err, ProfileField::Email));
    }

    #[test]
    fn mentions_field_respects_token_boundaries() {
        assert!(mentions_field("'email'", ProfileField::Email));
        assert!(mentions_field("items/0/email)", ProfileField::Email));
        assert!(mentions_field("email", ProfileField::Email));
        assert!(!mentions_field("user_email", ProfileField::Email));
        assert!(!mentions_field("emails", ProfileField::Email));
    }

    #[test]
    fn race_loss_covers_create_and_update_conflicts() {
        assert!(is_race_loss(StoreErrorKind::ConditionFailed));
        assert!(is_race_loss(StoreErrorKind::AlreadyExists));
        assert!(!is_race_loss(StoreErrorKind::Rejected));
    }
}
