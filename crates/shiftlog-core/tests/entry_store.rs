use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use shiftlog_core::filter::apply;
use shiftlog_core::stats::summarize;
use shiftlog_core::storage::JournalBackend;
use shiftlog_core::{
    Category, EntryCategory, EntryStatus, EntryStore, Equipment, FilterOptions, JournalEntry,
    Location, MemoryBackend, NewEntry, NewNamedRecord, Priority, ReferenceSnapshot, Result,
    ShiftlogError, Summary,
};

fn fault() -> NewEntry {
    NewEntry::new(
        EntryCategory::Emergency,
        "Fault",
        "Line trip",
        "Ivanov",
        Priority::Critical,
    )
}

fn store() -> EntryStore<MemoryBackend> {
    EntryStore::open(MemoryBackend::new()).expect("open should succeed")
}

#[test]
fn test_create_defaults_to_active() {
    let store = store();
    let entry = store.create(fault()).expect("create should succeed");

    assert_eq!(entry.status, EntryStatus::Active);
    assert!(entry.cancellation.is_none());
    assert_eq!(
        summarize(&store.list().unwrap()),
        Summary {
            total: 1,
            active: 1,
            drafts: 0,
            cancelled: 0,
            critical: 1,
        }
    );
}

#[test]
fn test_cancel_excludes_from_critical() {
    let store = store();
    let entry = store.create(fault()).unwrap();

    let cancelled = store
        .cancel(&entry.id, "False alarm", "Petrov")
        .expect("cancel should succeed");

    assert_eq!(cancelled.status, EntryStatus::Cancelled);
    let cancellation = cancelled.cancellation.expect("cancellation recorded");
    assert_eq!(cancellation.reason, "False alarm");
    assert_eq!(cancellation.cancelled_by, "Petrov");
    assert!(cancellation.cancelled_at >= entry.created_at);

    let summary = summarize(&store.list().unwrap());
    assert_eq!(summary.critical, 0);
    assert_eq!(summary.cancelled, 1);
}

#[test]
fn test_second_cancel_is_invalid_state() {
    let store = store();
    let entry = store.create(fault()).unwrap();
    store.cancel(&entry.id, "False alarm", "Petrov").unwrap();
    let before = store.list().unwrap();

    let err = store
        .cancel(&entry.id, "Another reason", "Sidorov")
        .unwrap_err();

    assert!(matches!(err, ShiftlogError::InvalidState(_)));
    assert_eq!(store.list().unwrap(), before);
}

#[test]
fn test_search_and_status_filter() {
    let store = store();
    let fault = store.create(fault()).unwrap();
    store.cancel(&fault.id, "False alarm", "Petrov").unwrap();
    store
        .create(NewEntry::new(
            EntryCategory::EquipmentWork,
            "Fault locator calibration",
            "Scheduled",
            "Ivanov",
            Priority::Low,
        ))
        .unwrap();

    let filters = FilterOptions::new()
        .search("fault")
        .status(EntryStatus::Cancelled);
    let selected = apply(&store.list().unwrap(), &filters);

    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, fault.id);

    store.set_filters(filters).unwrap();
    assert_eq!(store.filtered().unwrap(), selected);
}

#[test]
fn test_blank_title_leaves_store_unchanged() {
    let store = store();
    store.create(fault()).unwrap();
    let before = store.len().unwrap();

    let mut draft = fault();
    draft.title = String::new();
    let err = store.create(draft).unwrap_err();

    assert!(matches!(err, ShiftlogError::Validation(_)));
    assert_eq!(store.len().unwrap(), before);
}

#[test]
fn test_cancel_unknown_id_is_not_found() {
    let store = store();
    let err = store
        .cancel(&Uuid::now_v7(), "reason", "Petrov")
        .unwrap_err();
    assert!(matches!(err, ShiftlogError::EntryNotFound(_)));
}

#[test]
fn test_cancel_requires_reason_and_operator() {
    let store = store();
    let entry = store.create(fault()).unwrap();

    assert!(store.cancel(&entry.id, "   ", "Petrov").unwrap_err().is_validation());
    assert!(store.cancel(&entry.id, "reason", "").unwrap_err().is_validation());
    assert_eq!(store.get(&entry.id).unwrap().status, EntryStatus::Active);
}

#[test]
fn test_drafts_activate_once() {
    let store = store();
    let draft = store.create(fault().as_draft()).unwrap();
    assert_eq!(draft.status, EntryStatus::Draft);
    assert_eq!(summarize(&store.list().unwrap()).critical, 0);

    let active = store.activate(&draft.id).unwrap();
    assert_eq!(active.status, EntryStatus::Active);
    assert!(store.activate(&draft.id).unwrap_err().is_invalid_state());

    store.cancel(&draft.id, "Superseded", "Petrov").unwrap();
    assert!(store.activate(&draft.id).unwrap_err().is_invalid_state());
}

#[test]
fn test_draft_can_be_cancelled_directly() {
    let store = store();
    let draft = store.create(fault().as_draft()).unwrap();
    let cancelled = store.cancel(&draft.id, "Not needed", "Ivanov").unwrap();
    assert_eq!(cancelled.status, EntryStatus::Cancelled);
}

#[test]
fn test_every_entry_keeps_cancellation_consistent() {
    let store = store();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    for hour in 0..6 {
        let mut draft = fault().at(base + Duration::hours(hour));
        if hour % 3 == 0 {
            draft = draft.as_draft();
        }
        let entry = store.create(draft).unwrap();
        if hour % 2 == 0 {
            store.cancel(&entry.id, "Cleanup", "Petrov").unwrap();
        }
    }

    let entries = store.list().unwrap();
    assert!(entries.iter().all(JournalEntry::is_consistent));

    let summary = summarize(&entries);
    assert_eq!(summary.total, summary.active + summary.drafts + summary.cancelled);
}

#[test]
fn test_empty_filter_and_idempotence() {
    let store = store();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    for (hour, title) in ["Fault A", "Inspection", "fault b"].iter().enumerate() {
        let mut draft = fault().at(base + Duration::hours(hour as i64));
        draft.title = title.to_string();
        store.create(draft).unwrap();
    }
    let entries = store.list().unwrap();

    assert_eq!(apply(&entries, &FilterOptions::default()), entries);

    let filters = FilterOptions::new().search("FAULT");
    let once = apply(&entries, &filters);
    assert_eq!(once.len(), 2);
    assert_eq!(apply(&once, &filters), once);
}

#[test]
fn test_references_must_be_known_and_active() {
    let store = store();
    let (live, retired, location) = store
        .manage_references(|manager| {
            let live = manager.create_equipment(NewNamedRecord::new("T-1 transformer"))?;
            let retired = manager.create_equipment(NewNamedRecord::new("T-0 transformer"))?;
            manager.deactivate::<Equipment>(&retired.id)?;
            let location = manager.create_location(NewNamedRecord::new("Substation 7"))?;
            Ok((live, retired, location))
        })
        .unwrap();

    let entry = store
        .create(fault().with_equipment(live.id).with_location(location.id))
        .unwrap();
    let references = store.references().unwrap();
    assert_eq!(
        references.resolve(&entry).equipment_name(),
        Some("T-1 transformer")
    );

    let before = store.len().unwrap();
    assert!(store
        .create(fault().with_equipment(retired.id))
        .unwrap_err()
        .is_validation());
    assert!(store
        .create(fault().with_category_ref(Uuid::now_v7()))
        .unwrap_err()
        .is_validation());
    assert_eq!(store.len().unwrap(), before);

    // Deactivating later keeps the existing entry resolvable.
    store
        .manage_references(|manager| manager.deactivate::<Location>(&location.id))
        .unwrap();
    let references = store.references().unwrap();
    assert_eq!(
        references.resolve(&store.get(&entry.id).unwrap()).location_name(),
        Some("Substation 7")
    );
    assert!(references.active_locations().is_empty());
}

/// Backend that refuses every write.
#[derive(Default)]
struct ReadOnlyBackend {
    inner: MemoryBackend,
}

impl JournalBackend for ReadOnlyBackend {
    fn load_entries(&self) -> Result<Vec<JournalEntry>> {
        self.inner.load_entries()
    }

    fn insert_entry(&mut self, _entry: &JournalEntry) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn update_entry(&mut self, _entry: &JournalEntry) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn load_references(&self) -> Result<ReferenceSnapshot> {
        self.inner.load_references()
    }

    fn insert_category(&mut self, _category: &Category) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn update_category(&mut self, _category: &Category) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn insert_equipment(&mut self, _equipment: &Equipment) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn update_equipment(&mut self, _equipment: &Equipment) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn insert_location(&mut self, _location: &Location) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn update_location(&mut self, _location: &Location) -> Result<()> {
        Err(ShiftlogError::Storage("read-only".to_string()))
    }

    fn check_integrity(&self) -> Result<()> {
        self.inner.check_integrity()
    }
}

#[test]
fn test_failed_writes_leave_memory_unchanged() {
    let mut seeded = MemoryBackend::new();
    let existing = JournalEntry {
        id: Uuid::now_v7(),
        category: EntryCategory::Other,
        title: "Handover".to_string(),
        description: "Quiet shift".to_string(),
        timestamp: Utc::now(),
        author: "Ivanov".to_string(),
        status: EntryStatus::Active,
        priority: Priority::Low,
        equipment_id: None,
        location_id: None,
        category_id: None,
        cancellation: None,
        created_at: Utc::now(),
    };
    seeded.insert_entry(&existing).unwrap();

    let store = EntryStore::open(ReadOnlyBackend { inner: seeded }).unwrap();

    assert!(matches!(
        store.create(fault()),
        Err(ShiftlogError::Storage(_))
    ));
    assert!(matches!(
        store.cancel(&existing.id, "reason", "Petrov"),
        Err(ShiftlogError::Storage(_))
    ));
    assert_eq!(store.list().unwrap(), vec![existing]);
}

#[test]
fn test_concurrent_double_cancel_succeeds_once() {
    let store = Arc::new(store());
    let entry = store.create(fault()).unwrap();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["Petrov", "Sidorov"]
        .into_iter()
        .map(|operator| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let id = entry.id;
            thread::spawn(move || {
                barrier.wait();
                store.cancel(&id, "Duplicate", operator)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread should not panic"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(ShiftlogError::is_invalid_state));

    let store = Arc::try_unwrap(store).ok().expect("sole owner");
    let backend = store.into_backend().unwrap();
    let persisted = backend.load_entries().unwrap();
    assert_eq!(persisted[0].status, EntryStatus::Cancelled);
}
