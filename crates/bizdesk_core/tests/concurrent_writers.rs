use bizdesk_core::store::read_version;
use bizdesk_core::{
    BusinessDataService, CollectionRepository, CommitOutcome, Customer, CustomerDraft,
    KeyValueStore, ManualClock, MemoryKvStore, RepoError, StoreResult, UserPatch, WriteBatch,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Interleave = Box<dyn FnOnce(&MemoryKvStore) + Send>;

/// Runs one injected write right before the next commit reaches the store.
struct InterleavingStore {
    inner: MemoryKvStore,
    pending: Mutex<Option<Interleave>>,
}

impl InterleavingStore {
    fn new() -> Self {
        Self {
            inner: MemoryKvStore::new(),
            pending: Mutex::new(None),
        }
    }

    fn before_next_commit(&self, write: impl FnOnce(&MemoryKvStore) + Send + 'static) {
        *self.pending.lock().unwrap() = Some(Box::new(write));
    }
}

impl KeyValueStore for InterleavingStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }

    fn commit(&self, batch: &WriteBatch) -> StoreResult<CommitOutcome> {
        let pending = self.pending.lock().unwrap().take();
        if let Some(write) = pending {
            write(&self.inner);
        }
        self.inner.commit(batch)
    }
}

fn draft(name: &str) -> CustomerDraft {
    CustomerDraft {
        name: name.to_string(),
        ..CustomerDraft::default()
    }
}

#[test]
fn interleaved_add_surfaces_conflict_instead_of_losing_a_write() {
    let store = InterleavingStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);
    repo.initialize().unwrap();

    store.before_next_commit(|inner| {
        let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
        CollectionRepository::<Customer, _>::new(inner, &clock)
            .add(draft("Other writer"))
            .unwrap();
    });

    let err = repo.add(draft("Mine")).unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(
        err,
        RepoError::Conflict {
            collection: "customers",
            ..
        }
    ));

    let names = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|customer| customer.name)
        .collect::<Vec<_>>();
    assert!(names.contains(&"Other writer".to_string()));
    assert!(!names.contains(&"Mine".to_string()));

    let retried = repo.add(draft("Mine")).unwrap();
    assert_eq!(retried.id, "5");
    assert_eq!(repo.count().unwrap(), 5);
}

#[test]
fn interleaved_delete_does_not_resurrect_or_drop_records() {
    let store = InterleavingStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);
    repo.initialize().unwrap();

    store.before_next_commit(|inner| {
        let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
        assert!(CollectionRepository::<Customer, _>::new(inner, &clock)
            .delete("2")
            .unwrap());
    });

    assert!(repo.delete("1").unwrap_err().is_conflict());
    let ids = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|customer| customer.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, ["1", "3"]);
}

#[test]
fn writer_racing_a_reset_cannot_bring_back_old_records() {
    let store = InterleavingStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let service = BusinessDataService::new(&store, &clock);
    service.initialize_all().unwrap();

    // Lands right before the reset commits; the version it observes is the
    // newest one any pre-reset snapshot can hold.
    let observed = Arc::new(AtomicU64::new(0));
    let seen = Arc::clone(&observed);
    store.before_next_commit(move |inner| {
        let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
        CollectionRepository::<Customer, _>::new(inner, &clock)
            .add(draft("Written during reset"))
            .unwrap();
        seen.store(
            read_version(inner, "customers:version").unwrap(),
            Ordering::SeqCst,
        );
    });
    service.reset_all().unwrap();
    assert_eq!(store.get("customers").unwrap(), None);

    let stale = WriteBatch::guarded("customers:version", observed.load(Ordering::SeqCst))
        .set("customers", r#"[{"stale":true}]"#);
    assert!(matches!(
        store.commit(&stale).unwrap(),
        CommitOutcome::Conflict { .. }
    ));

    let customers = service.customers().list().unwrap();
    assert_eq!(customers.len(), 3);
    assert!(customers.iter().all(|c| c.name != "Written during reset"));
}

#[test]
fn add_from_a_pre_reset_snapshot_conflicts() {
    let store = InterleavingStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);
    repo.add(draft("Before reset")).unwrap();

    store.before_next_commit(|inner| {
        let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
        BusinessDataService::new(inner, &clock).reset_all().unwrap();
    });

    assert!(repo.add(draft("Stale")).unwrap_err().is_conflict());
    let names = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|customer| customer.name)
        .collect::<Vec<_>>();
    assert_eq!(names.len(), 3);
    assert!(!names.iter().any(|name| name == "Before reset" || name == "Stale"));
}

#[test]
fn profile_update_racing_clear_conflicts_instead_of_restoring() {
    let store = InterleavingStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let users = BusinessDataService::new(&store, &clock).users();
    users
        .update(UserPatch {
            name: Some("Dana".to_string()),
            ..UserPatch::default()
        })
        .unwrap();

    store.before_next_commit(|inner| {
        let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
        BusinessDataService::new(inner, &clock)
            .users()
            .clear()
            .unwrap();
    });

    let err = users
        .update(UserPatch {
            business_name: Some(Some("Stale Traders".to_string())),
            ..UserPatch::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Conflict {
            collection: "user_profile",
            ..
        }
    ));

    let profile = users.get().unwrap().unwrap();
    assert_eq!(profile.name, "Business Owner");
    assert_eq!(profile.business_name.as_deref(), Some("My Business"));
}

#[test]
fn guarded_profile_write_after_clear_conflicts() {
    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let users = BusinessDataService::new(&store, &clock).users();
    users.get().unwrap();

    let before_clear = read_version(&store, "user_profile:version").unwrap();
    users.clear().unwrap();

    let stale = WriteBatch::guarded("user_profile:version", before_clear)
        .set("user_profile", r#"{"stale":true}"#);
    assert!(matches!(
        store.commit(&stale).unwrap(),
        CommitOutcome::Conflict { .. }
    ));
    assert_eq!(store.get("user_profile").unwrap(), None);
}

#[test]
fn parallel_writers_with_retry_never_reuse_ids() {
    const THREADS: usize = 4;
    const ADDS_PER_THREAD: usize = 10;

    let store = MemoryKvStore::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    CollectionRepository::<Customer, _>::new(&store, &clock)
        .initialize()
        .unwrap();

    let issued = std::thread::scope(|scope| {
        let handles = (0..THREADS)
            .map(|thread| {
                let store = &store;
                let clock = &clock;
                scope.spawn(move || {
                    let repo = CollectionRepository::<Customer, _>::new(store, clock);
                    let mut ids = Vec::new();
                    for n in 0..ADDS_PER_THREAD {
                        loop {
                            match repo.add(draft(&format!("T{thread}-{n}"))) {
                                Ok(customer) => {
                                    ids.push(customer.id);
                                    break;
                                }
                                Err(err) if err.is_conflict() => continue,
                                Err(err) => panic!("unexpected error: {err}"),
                            }
                        }
                    }
                    ids
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    let unique = issued.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), THREADS * ADDS_PER_THREAD);

    let repo = CollectionRepository::<Customer, _>::new(&store, &clock);
    assert_eq!(repo.count().unwrap(), 3 + THREADS * ADDS_PER_THREAD);
    assert_eq!(
        store.get("customers:last_id").unwrap().as_deref(),
        Some("43")
    );
}
