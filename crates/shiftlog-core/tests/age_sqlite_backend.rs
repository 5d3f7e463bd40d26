use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use shiftlog_core::storage::{AgeSqliteBackend, JournalBackend};
use shiftlog_core::{
    Category, EntryCategory, EntryStatus, EntryStore, Equipment, NewCategory, NewEntry,
    NewNamedRecord, Priority, ReferenceUpdate, ShiftlogError,
};

const PASSPHRASE: &str = "test-passphrase-secure-123";

struct Journal {
    _dir: TempDir,
    path: PathBuf,
}

impl Journal {
    fn create() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("journal.shiftlog");
        AgeSqliteBackend::create(&path, PASSPHRASE).expect("create should succeed");
        Self { _dir: dir, path }
    }

    fn store(&self) -> EntryStore<AgeSqliteBackend> {
        let backend = AgeSqliteBackend::open(&self.path, PASSPHRASE).expect("open should succeed");
        EntryStore::open(backend).expect("store should load")
    }
}

fn close(store: EntryStore<AgeSqliteBackend>) {
    store
        .into_backend()
        .expect("backend")
        .close()
        .expect("close should succeed");
}

#[test]
fn test_file_is_encrypted_at_rest() {
    let journal = Journal::create();
    let store = journal.store();
    store
        .create(NewEntry::new(
            EntryCategory::Emergency,
            "Fault",
            "Line trip on feeder 12",
            "Ivanov",
            Priority::Critical,
        ))
        .unwrap();
    close(store);

    let on_disk = fs::read(&journal.path).unwrap();
    assert!(on_disk.starts_with(b"age-encryption.org/v1"));
    let haystack = String::from_utf8_lossy(&on_disk);
    assert!(!haystack.contains("feeder 12"));
    assert!(!haystack.contains("SQLite format"));
}

#[test]
fn test_wrong_passphrase_fails() {
    let journal = Journal::create();
    let result = AgeSqliteBackend::open(&journal.path, "wrong-passphrase-456");
    assert!(matches!(result, Err(ShiftlogError::IncorrectPassphrase)));
}

#[test]
fn test_entries_survive_reopen() {
    let journal = Journal::create();

    let store = journal.store();
    let fault = store
        .create(NewEntry::new(
            EntryCategory::Emergency,
            "Fault",
            "Line trip",
            "Ivanov",
            Priority::Critical,
        ))
        .unwrap();
    let draft = store
        .create(
            NewEntry::new(
                EntryCategory::TeamPermits,
                "Permit 42",
                "Crew B on line 7",
                "Ivanov",
                Priority::Medium,
            )
            .as_draft(),
        )
        .unwrap();
    store.cancel(&fault.id, "False alarm", "Petrov").unwrap();
    let before = store.list().unwrap();
    close(store);

    let store = journal.store();
    assert_eq!(store.list().unwrap(), before);
    assert_eq!(store.get(&draft.id).unwrap().status, EntryStatus::Draft);

    let reloaded = store.get(&fault.id).unwrap();
    assert_eq!(reloaded.status, EntryStatus::Cancelled);
    assert_eq!(reloaded.cancellation.unwrap().reason, "False alarm");

    store.with_backend(|backend| backend.check_integrity()).unwrap();
}

#[test]
fn test_unsaved_changes_are_not_written() {
    let journal = Journal::create();

    let store = journal.store();
    store
        .create(NewEntry::new(
            EntryCategory::Other,
            "Handover",
            "Quiet",
            "Ivanov",
            Priority::Low,
        ))
        .unwrap();
    drop(store);

    assert!(journal.store().is_empty().unwrap());
}

#[test]
fn test_reference_data_round_trip() {
    let journal = Journal::create();

    let store = journal.store();
    let (category, equipment) = store
        .manage_references(|manager| {
            let category = manager.create_category(
                NewCategory::new("RZA", "Relay protection")
                    .with_description("Relay and automation")
                    .with_sort_order(2),
            )?;
            let equipment = manager.create_equipment(NewNamedRecord::new("Breaker Q1"))?;
            manager.update::<Category>(&category.id, &ReferenceUpdate::new().sort_order(1))?;
            manager.deactivate::<Equipment>(&equipment.id)?;
            Ok((category, equipment))
        })
        .unwrap();
    store
        .create(
            NewEntry::new(
                EntryCategory::RelayProtection,
                "Relay check",
                "Settings verified",
                "Ivanov",
                Priority::Low,
            )
            .with_category_ref(category.id),
        )
        .unwrap();
    close(store);

    let store = journal.store();
    let references = store.references().unwrap();
    let stored_category = references.category(&category.id).unwrap();
    assert_eq!(stored_category.sort_order, 1);
    assert_eq!(
        stored_category.description.as_deref(),
        Some("Relay and automation")
    );
    assert!(!references.equipment(&equipment.id).unwrap().is_active);

    let duplicate = store.manage_references(|manager| {
        manager.create_category(NewCategory::new("rza", "Duplicate"))
    });
    assert!(duplicate.unwrap_err().is_validation());
}

#[test]
fn test_last_modified_advances_on_write() {
    let journal = Journal::create();
    let store = journal.store();
    let before = store.with_backend(|backend| backend.metadata()).unwrap();

    store
        .create(NewEntry::new(
            EntryCategory::Other,
            "Handover",
            "Quiet",
            "Ivanov",
            Priority::Low,
        ))
        .unwrap();

    let after = store.with_backend(|backend| backend.metadata()).unwrap();
    assert!(after.last_modified >= before.last_modified);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn test_update_unknown_entry_is_not_found() {
    let journal = Journal::create();
    let store = journal.store();
    let entry = store
        .create(NewEntry::new(
            EntryCategory::Other,
            "Handover",
            "Quiet",
            "Ivanov",
            Priority::Low,
        ))
        .unwrap();

    let mut backend = store.into_backend().unwrap();
    let mut ghost = entry.clone();
    ghost.id = uuid::Uuid::now_v7();
    assert!(backend.update_entry(&ghost).unwrap_err().is_not_found());
}
