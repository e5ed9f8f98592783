use bizdesk_core::{
    CollectionRepository, Customer, CustomerDraft, CustomerPatch, CustomerStatus, ManualClock,
    MemoryKvStore, StatusFilter,
};
use chrono::Duration;

fn acme_draft() -> CustomerDraft {
    CustomerDraft {
        name: "Acme".to_string(),
        status: CustomerStatus::Active,
        outstanding_balance: 0.0,
        total_purchases: 0.0,
        email: Some("a@b.com".to_string()),
        phone: Some("555".to_string()),
        ..CustomerDraft::default()
    }
}

#[test]
fn add_update_delete_scenario_after_default_seed() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);

    let added = repo.add(acme_draft()).unwrap();
    assert_eq!(added.id, "4");
    assert_eq!(added.created_at, added.updated_at);

    clock.advance(Duration::milliseconds(250));
    let updated = repo
        .update(
            "4",
            CustomerPatch {
                status: Some(CustomerStatus::Blocked),
                ..CustomerPatch::default()
            },
        )
        .unwrap()
        .expect("customer 4 should exist");
    assert_eq!(updated.status, CustomerStatus::Blocked);
    assert!(updated.updated_at > added.updated_at);

    assert!(repo.delete("4").unwrap());
    assert_eq!(repo.get_by_id("4").unwrap(), None);
}

#[test]
fn add_then_get_returns_draft_plus_assigned_fields() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);

    let added = repo.add(acme_draft()).unwrap();
    let loaded = repo.get_by_id(&added.id).unwrap().unwrap();

    assert_eq!(loaded, added);
    assert_eq!(loaded.name, "Acme");
    assert_eq!(loaded.email.as_deref(), Some("a@b.com"));
    assert_eq!(loaded.phone.as_deref(), Some("555"));
    assert_eq!(loaded.company, None);
    assert_eq!(loaded.created_at, clock_now(&clock));
}

#[test]
fn update_changes_only_patched_field_and_updated_at() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);

    let before = repo.get_by_id("2").unwrap().unwrap();
    clock.advance(Duration::seconds(3));
    let after = repo
        .update(
            "2",
            CustomerPatch {
                phone: Some(Some("+1 555 9999".to_string())),
                ..CustomerPatch::default()
            },
        )
        .unwrap()
        .unwrap();

    let mut expected = before.clone();
    expected.phone = Some("+1 555 9999".to_string());
    expected.updated_at = after.updated_at;
    assert_eq!(after, expected);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[test]
fn update_missing_id_returns_none_without_writing() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);
    repo.initialize().unwrap();
    let writes = store.write_count();

    let result = repo
        .update(
            "404",
            CustomerPatch {
                name: Some("Ghost".to_string()),
                ..CustomerPatch::default()
            },
        )
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(store.write_count(), writes);
}

#[test]
fn update_can_clear_nullable_fields() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);

    let updated = repo
        .update(
            "1",
            CustomerPatch {
                company: Some(None),
                credit_limit: Some(None),
                ..CustomerPatch::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.company, None);
    assert_eq!(updated.credit_limit, None);
    assert_eq!(updated.name, "John Smith");
}

#[test]
fn invalid_writes_are_rejected_before_persistence() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);

    let blank = CustomerDraft {
        name: "  ".to_string(),
        ..CustomerDraft::default()
    };
    let err = repo.add(blank).unwrap_err();
    assert!(matches!(err, bizdesk_core::RepoError::Validation(ref v) if v.field == "name"));

    let err = repo
        .update(
            "1",
            CustomerPatch {
                email: Some(Some("broken".to_string())),
                ..CustomerPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, bizdesk_core::RepoError::Validation(ref v) if v.field == "email"));

    let stored = repo.get_by_id("1").unwrap().unwrap();
    assert_eq!(stored.email.as_deref(), Some("john.smith@example.com"));
    assert_eq!(repo.count().unwrap(), 3);
}

#[test]
fn search_filters_status_then_matches_text_case_insensitively() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);
    repo.add(acme_draft()).unwrap();

    let by_company = repo.search("garcia DESIGN", StatusFilter::All).unwrap();
    assert_eq!(
        by_company.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        ["2"]
    );

    let by_phone = repo.search("555", StatusFilter::All).unwrap();
    assert_eq!(by_phone.len(), 4);

    let active_only = repo
        .search("555", StatusFilter::Only(CustomerStatus::Active))
        .unwrap();
    assert_eq!(
        active_only.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        ["1", "2", "4"]
    );

    let inactive_blank_query = repo
        .search("   ", StatusFilter::Only(CustomerStatus::Inactive))
        .unwrap();
    assert_eq!(inactive_blank_query.len(), 1);
    assert_eq!(inactive_blank_query[0].id, "3");

    assert!(repo.search("zzz", StatusFilter::All).unwrap().is_empty());
}

#[test]
fn customer_balance_adjustment_rejects_negative_result() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);

    let paid = repo.adjust_balance("1", -250.0).unwrap().unwrap();
    assert_eq!(paid.outstanding_balance, 1000.0);

    let err = repo.adjust_balance("1", -5000.0).unwrap_err();
    assert!(matches!(err, bizdesk_core::RepoError::Validation(_)));
    assert_eq!(
        repo.get_by_id("1").unwrap().unwrap().outstanding_balance,
        1000.0
    );
    assert_eq!(repo.adjust_balance("404", 1.0).unwrap(), None);
}

fn clock_now(clock: &ManualClock) -> chrono::DateTime<chrono::Utc> {
    use bizdesk_core::Clock;
    clock.now()
}
