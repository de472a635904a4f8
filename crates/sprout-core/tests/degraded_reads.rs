use futures::executor::block_on;
use sprout_core::{
    ConfigModel, Profile, ProfileReadApi, SubjectId, Tier,
    dto::{error::ErrorCode, page::PageRequest, read::Provenance},
    interface::store::{RecordStore, StoreError},
    storage::{
        memory::MemoryRecordStore,
        record::{FieldMap, FieldValue, ProfileField, ProfileFilter},
    },
};
use sprout_testkit::{FaultPoint, FaultyStore};
use std::sync::Arc;

fn legacy_row(id: &str) -> FieldMap {
    FieldMap::from([
        (ProfileField::Id, FieldValue::str(id)),
        (ProfileField::Owner, FieldValue::str(id)),
        (ProfileField::Email, FieldValue::Null),
        (ProfileField::DisplayName, FieldValue::str(id)),
    ])
}

fn clean(id: &str, tier: Tier) -> Profile {
    Profile::new_default(id.into(), format!("{id}@example.com"), id, tier, 1)
}

fn strict_store() -> Arc<MemoryRecordStore> {
    Arc::new(MemoryRecordStore::new().with_strict_field(ProfileField::Email))
}

fn api(store: Arc<dyn RecordStore>) -> ProfileReadApi {
    ProfileReadApi::new(store, Arc::new(ConfigModel::default()))
}

#[test]
fn clean_reads_keep_full_provenance() {
    let store = strict_store();
    block_on(store.create(clean("a", Tier::Free))).unwrap();

    let result = block_on(api(store).get_profile(&"a".into())).unwrap();

    assert_eq!(result.provenance, Provenance::Full);
    assert_eq!(
        result.data.unwrap().email.as_deref(),
        Some("a@example.com")
    );
}

#[test]
fn missing_profiles_read_as_none() {
    let result = block_on(api(strict_store()).get_profile(&"nobody".into())).unwrap();

    assert_eq!(result.provenance, Provenance::Full);
    assert!(result.data.is_none());
}

#[test]
fn null_email_reads_degrade_and_say_so() {
    let store = strict_store();
    store.insert_raw("legacy", legacy_row("legacy"));

    let result = block_on(api(store).get_profile(&"legacy".into())).unwrap();

    assert!(result.is_degraded());
    let profile = result.data.unwrap();
    assert_eq!(profile.email, None);
    assert_eq!(profile.display_name.as_deref(), Some("legacy"));

    let json = serde_json::to_value(
        block_on(api(strict_store()).get_profile(&"none".into())).unwrap(),
    )
    .unwrap();
    assert_eq!(json["provenance"], "full");
}

#[test]
fn mixed_pages_degrade_as_a_whole_and_keep_paging() {
    let store = strict_store();
    for id in ["a", "c", "e"] {
        block_on(store.create(clean(id, Tier::Free))).unwrap();
    }
    store.insert_raw("b", legacy_row("b"));
    store.insert_raw("d", legacy_row("d"));
    let api = api(store);

    let first = block_on(api.list_profiles(ProfileFilter::default(), PageRequest::first(2)))
        .unwrap();
    assert_eq!(first.provenance, Provenance::Reduced);
    assert!(first.data.items.iter().all(|p| p.email.is_none()));
    let ids: Vec<_> = first.data.items.iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, ["a", "b"]);

    let cursor = first.data.cursor.expect("more pages");
    let second = block_on(api.list_profiles(
        ProfileFilter::default(),
        PageRequest::after(cursor, 2),
    ))
    .unwrap();
    let ids: Vec<_> = second.data.items.iter().map(|p| p.id.to_string()).collect();
    assert_eq!(ids, ["c", "d"]);

    let filtered = block_on(api.list_profiles(
        ProfileFilter {
            tier: Some(Tier::Free),
            owner: Some(SubjectId::from("e")),
        },
        PageRequest::default(),
    ))
    .unwrap();
    assert_eq!(filtered.provenance, Provenance::Full);
    assert_eq!(filtered.data.items.len(), 1);
    assert!(filtered.data.is_last());
}

#[test]
fn other_failures_are_never_retried() {
    struct Case {
        name: &'static str,
        message: &'static str,
        code: ErrorCode,
    }

    let cases = [
        Case {
            name: "nullability on another field",
            message: "Cannot return null for non-nullable type: 'String' within parent 'Profile' (/getProfile/emailVerified)",
            code: ErrorCode::Internal,
        },
        Case {
            name: "email mentioned without nullability",
            message: "email index throttled",
            code: ErrorCode::Unavailable,
        },
    ];

    for case in cases {
        let memory = Arc::new(MemoryRecordStore::new());
        let store = Arc::new(FaultyStore::new(Arc::clone(&memory)));
        store.fail_once(FaultPoint::Get, StoreError::unclassified(case.message));

        let err = block_on(api(store).get_profile(&"a".into())).unwrap_err();

        assert_eq!(err.code, case.code, "{}", case.name);
    }
}

#[test]
fn persistent_email_violation_surfaces_after_one_retry() {
    let memory = Arc::new(MemoryRecordStore::new());
    let store = Arc::new(FaultyStore::new(memory));
    store.fail(
        FaultPoint::Get,
        StoreError::unclassified(
            "Cannot return null for non-nullable type: 'String' within parent 'Profile' (/getProfile/email)",
        ),
    );

    let err = block_on(api(store).get_profile(&"a".into())).unwrap_err();

    assert_eq!(err.code, ErrorCode::InvariantViolation);
}
