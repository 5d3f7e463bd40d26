//! The entry store.
//!
//! [`EntryStore`] owns the in-memory view of the journal and the active
//! filter criteria, and pushes every mutation through a [`JournalBackend`]
//! before applying it locally.
//!
//! Lock order is entries, then backend, then references. Mutations hold the
//! entries write lock for the whole check, persist, apply sequence, so two
//! concurrent cancels of the same entry cannot both succeed.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, ShiftlogError};
use crate::filter::{self, FilterOptions};
use crate::lifecycle;
use crate::model::{JournalEntry, NewEntry, ReferenceSnapshot};
use crate::references::ReferenceManager;
use crate::stats::{self, Summary};
use crate::storage::JournalBackend;

/// Journal entries held newest-first, backed by a persistence collaborator.
pub struct EntryStore<B: JournalBackend> {
    backend: Mutex<B>,
    entries: RwLock<Vec<JournalEntry>>,
    references: RwLock<ReferenceSnapshot>,
    filters: RwLock<FilterOptions>,
}

fn poisoned(what: &str) -> ShiftlogError {
    ShiftlogError::Storage(format!("{} lock poisoned", what))
}

/// Stable sort: newest timestamp first, ties keep their current order.
fn sort_newest_first(entries: &mut [JournalEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

impl<B: JournalBackend> EntryStore<B> {
    /// Load entries and reference data from `backend`.
    pub fn open(backend: B) -> Result<Self> {
        let mut entries = backend.load_entries()?;
        sort_newest_first(&mut entries);
        let references = backend.load_references()?;

        tracing::debug!(
            target: "shiftlog",
            event = "store_loaded",
            entries = entries.len(),
            categories = references.categories.len(),
            equipment = references.equipment.len(),
            locations = references.locations.len()
        );

        Ok(Self {
            backend: Mutex::new(backend),
            entries: RwLock::new(entries),
            references: RwLock::new(references),
            filters: RwLock::new(FilterOptions::default()),
        })
    }

    fn read_entries(&self) -> Result<RwLockReadGuard<'_, Vec<JournalEntry>>> {
        self.entries.read().map_err(|_| poisoned("Entries"))
    }

    fn write_entries(&self) -> Result<RwLockWriteGuard<'_, Vec<JournalEntry>>> {
        self.entries.write().map_err(|_| poisoned("Entries"))
    }

    fn lock_backend(&self) -> Result<MutexGuard<'_, B>> {
        self.backend.lock().map_err(|_| poisoned("Backend"))
    }

    fn read_references(&self) -> Result<RwLockReadGuard<'_, ReferenceSnapshot>> {
        self.references.read().map_err(|_| poisoned("References"))
    }

    /// All entries, newest `timestamp` first.
    pub fn list(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.read_entries()?.clone())
    }

    pub fn get(&self, id: &Uuid) -> Result<JournalEntry> {
        self.read_entries()?
            .iter()
            .find(|entry| entry.id == *id)
            .cloned()
            .ok_or(ShiftlogError::EntryNotFound(*id))
    }

    /// Number of entries held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_entries()?.is_empty())
    }

    /// Validate, persist and insert a new entry.
    ///
    /// # Errors
    ///
    /// `Validation` for blank text fields, a cancelled initial status, or an
    /// unknown or inactive reference. Backend failures leave the store as it was.
    pub fn create(&self, draft: NewEntry) -> Result<JournalEntry> {
        draft.validate()?;
        lifecycle::ensure_initial(draft.status)?;

        let mut entries = self.write_entries()?;
        let mut backend = self.lock_backend()?;
        self.read_references()?.check_new_references(
            draft.equipment_id,
            draft.location_id,
            draft.category_id,
        )?;

        let entry = JournalEntry {
            id: Uuid::now_v7(),
            category: draft.category,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            timestamp: draft.timestamp,
            author: draft.author.trim().to_string(),
            status: draft.status,
            priority: draft.priority,
            equipment_id: draft.equipment_id,
            location_id: draft.location_id,
            category_id: draft.category_id,
            cancellation: None,
            created_at: Utc::now(),
        };

        backend.insert_entry(&entry)?;

        let position = entries.partition_point(|existing| existing.timestamp >= entry.timestamp);
        entries.insert(position, entry.clone());

        tracing::info!(
            target: "shiftlog",
            event = "entry_created",
            id = %entry.id,
            category = %entry.category,
            priority = %entry.priority,
            status = %entry.status
        );
        Ok(entry)
    }

    /// Cancel an entry with an audit reason.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` for an unknown id, `InvalidState` if already cancelled,
    /// `Validation` for an empty reason or operator name.
    pub fn cancel(&self, id: &Uuid, reason: &str, cancelled_by: &str) -> Result<JournalEntry> {
        let cancelled = self.transition(id, |entry| {
            lifecycle::cancel(entry, reason, cancelled_by, Utc::now())
        })?;

        tracing::info!(
            target: "shiftlog",
            event = "entry_cancelled",
            id = %cancelled.id,
            cancelled_by = cancelled_by.trim()
        );
        Ok(cancelled)
    }

    /// Promote a draft to active.
    pub fn activate(&self, id: &Uuid) -> Result<JournalEntry> {
        let activated = self.transition(id, lifecycle::activate)?;
        tracing::info!(target: "shiftlog", event = "entry_activated", id = %activated.id);
        Ok(activated)
    }

    fn transition(
        &self,
        id: &Uuid,
        apply: impl FnOnce(&JournalEntry) -> Result<JournalEntry>,
    ) -> Result<JournalEntry> {
        let mut entries = self.write_entries()?;
        let index = entries
            .iter()
            .position(|entry| entry.id == *id)
            .ok_or(ShiftlogError::EntryNotFound(*id))?;

        let updated = apply(&entries[index])?;
        self.lock_backend()?.update_entry(&updated)?;
        entries[index] = updated.clone();
        Ok(updated)
    }

    /// Replace the in-memory view with what the backend holds.
    pub fn refresh(&self) -> Result<()> {
        let mut entries = self.write_entries()?;
        let backend = self.lock_backend()?;
        let mut loaded = backend.load_entries()?;
        sort_newest_first(&mut loaded);
        let references = backend.load_references()?;

        *entries = loaded;
        *self.references.write().map_err(|_| poisoned("References"))? = references;
        tracing::debug!(target: "shiftlog", event = "store_refreshed", entries = entries.len());
        Ok(())
    }

    /// Copy of the current reference data.
    pub fn references(&self) -> Result<ReferenceSnapshot> {
        Ok(self.read_references()?.clone())
    }

    /// Run reference management against the backend, then reload the snapshot.
    ///
    /// The snapshot is reloaded even when `f` fails, so partial changes made
    /// before the failure are visible.
    pub fn manage_references<T>(
        &self,
        f: impl FnOnce(&mut ReferenceManager<'_, B>) -> Result<T>,
    ) -> Result<T> {
        let mut backend = self.lock_backend()?;
        let result = {
            let mut manager = ReferenceManager::new(&mut *backend);
            f(&mut manager)
        };
        let snapshot = backend.load_references()?;
        *self.references.write().map_err(|_| poisoned("References"))? = snapshot;
        result
    }

    pub fn filters(&self) -> Result<FilterOptions> {
        Ok(self
            .filters
            .read()
            .map_err(|_| poisoned("Filters"))?
            .clone())
    }

    pub fn set_filters(&self, filters: FilterOptions) -> Result<()> {
        *self.filters.write().map_err(|_| poisoned("Filters"))? = filters;
        Ok(())
    }

    pub fn clear_filters(&self) -> Result<()> {
        self.set_filters(FilterOptions::default())
    }

    /// Entries selected by the active filters, newest first.
    pub fn filtered(&self) -> Result<Vec<JournalEntry>> {
        let filters = self.filters()?;
        let entries = self.read_entries()?;
        Ok(filter::apply(&entries, &filters))
    }

    /// Summary over the filtered view.
    pub fn summary(&self) -> Result<Summary> {
        Ok(stats::summarize(&self.filtered()?))
    }

    /// Consume the store and hand back its backend (e.g. to close it).
    pub fn into_backend(self) -> Result<B> {
        self.backend.into_inner().map_err(|_| poisoned("Backend"))
    }

    /// Run a closure with shared access to the backend.
    pub fn with_backend<T>(&self, f: impl FnOnce(&B) -> Result<T>) -> Result<T> {
        let backend = self.lock_backend()?;
        f(&backend)
    }
}
