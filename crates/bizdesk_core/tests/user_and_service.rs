use bizdesk_core::{
    BusinessDataService, CustomerDraft, DataSummary, KeyValueStore, ManualClock, MemoryKvStore,
    RepoError, SqliteKvStore, UserPatch, UserRole,
};
use chrono::Duration;

#[test]
fn user_profile_is_seeded_on_first_read() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let service = BusinessDataService::new(&store, &clock);

    let user = service.users().get().unwrap().unwrap();
    assert_eq!(user.id, "1");
    assert_eq!(user.role, UserRole::Owner);
    assert_eq!(user.base_currency, "USD");
    assert_eq!(user.created_at, user.updated_at);
}

#[test]
fn user_update_merges_fields_and_keeps_identity() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let users = BusinessDataService::new(&store, &clock).users();
    let before = users.get().unwrap().unwrap();

    clock.advance(Duration::minutes(2));
    let patch: UserPatch = serde_json::from_str(
        r#"{"name":"Dana","email":"dana@example.com","businessName":null,"id":"99"}"#,
    )
    .unwrap();
    let after = users.update(patch).unwrap().unwrap();

    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.name, "Dana");
    assert_eq!(after.email.as_deref(), Some("dana@example.com"));
    assert_eq!(after.business_name, None);
    assert_eq!(after.base_currency, "USD");
    assert_eq!(users.get().unwrap().unwrap(), after);
}

#[test]
fn user_update_rejects_invalid_base_currency() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let users = BusinessDataService::new(&store, &clock).users();

    let err = users
        .update(UserPatch {
            base_currency: Some("dollars".to_string()),
            ..UserPatch::default()
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(ref v) if v.field == "baseCurrency"));
    assert_eq!(users.get().unwrap().unwrap().base_currency, "USD");
}

#[test]
fn user_save_keeps_stored_identity_and_clear_reseeds() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let users = BusinessDataService::new(&store, &clock).users();
    let original = users.get().unwrap().unwrap();

    clock.advance(Duration::seconds(30));
    let mut replacement = original.clone();
    replacement.id = "7".to_string();
    replacement.role = UserRole::Admin;
    let saved = users.save(replacement).unwrap();
    assert_eq!(saved.id, "1");
    assert_eq!(saved.created_at, original.created_at);
    assert_eq!(saved.role, UserRole::Admin);

    users.clear().unwrap();
    let reseeded = users.get().unwrap().unwrap();
    assert_eq!(reseeded.role, UserRole::Owner);
    assert!(reseeded.created_at > original.created_at);
}

#[test]
fn corrupt_user_profile_reads_as_none_and_blocks_update() {
    let store = MemoryKvStore::new();
    store.raw_set("user_profile", "oops");
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let users = BusinessDataService::new(&store, &clock).users();

    assert_eq!(users.get().unwrap(), None);
    assert!(matches!(
        users.update(UserPatch::default()),
        Err(RepoError::CorruptCollection { .. })
    ));
}

#[test]
fn save_refuses_to_overwrite_corrupt_profile_until_cleared() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let users = BusinessDataService::new(&store, &clock).users();
    let replacement = users.get().unwrap().unwrap();
    store.raw_set("user_profile", "oops");

    assert!(matches!(
        users.save(replacement.clone()),
        Err(RepoError::CorruptCollection {
            collection: "user_profile",
            ..
        })
    ));
    assert_eq!(store.get("user_profile").unwrap().as_deref(), Some("oops"));

    users.clear().unwrap();
    let saved = users.save(replacement).unwrap();
    assert_eq!(saved.name, "Business Owner");
    assert_eq!(users.get().unwrap().unwrap(), saved);
}

#[test]
fn initialize_all_then_summary_reports_seed_counts() {
    let store = SqliteKvStore::open_in_memory().unwrap();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let service = BusinessDataService::new(&store, &clock);

    service.initialize_all().unwrap();
    assert!(store.get("user_profile").unwrap().is_some());
    assert_eq!(
        service.summary().unwrap(),
        DataSummary {
            customers: 3,
            vendors: 3,
            products: 3,
            currencies: 3,
            categories: 3,
            account_groups: 3,
        }
    );
}

#[test]
fn reset_all_clears_owned_keys_and_restarts_ids() {
    let store = MemoryKvStore::new();
    store.raw_set("unrelated", "keep me");
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let service = BusinessDataService::new(&store, &clock);

    service
        .customers()
        .add(CustomerDraft {
            name: "Before reset".to_string(),
            ..CustomerDraft::default()
        })
        .unwrap();
    service.users().get().unwrap();
    service.reset_all().unwrap();

    for key in ["customers", "customers:last_id", "user_profile", "vendors"] {
        assert_eq!(store.get(key).unwrap(), None, "{key} should be removed");
    }
    assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("keep me"));

    let after = service
        .customers()
        .add(CustomerDraft {
            name: "After reset".to_string(),
            ..CustomerDraft::default()
        })
        .unwrap();
    assert_eq!(after.id, "4");
    assert_eq!(service.summary().unwrap().customers, 4);
}

#[test]
fn reset_all_bumps_versions_so_stale_writers_conflict() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let service = BusinessDataService::new(&store, &clock);
    service.initialize_all().unwrap();

    let before = store.get("customers:version").unwrap();
    service.reset_all().unwrap();
    let after = store.get("customers:version").unwrap();
    assert_ne!(before, after);
    assert!(store.get("user_profile:version").unwrap().is_some());
}
