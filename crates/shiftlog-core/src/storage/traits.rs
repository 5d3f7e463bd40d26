//! Persistence collaborator interface.
//!
//! The entry store and reference managers never touch storage directly; they
//! go through a `JournalBackend`. Any failure is propagated to the caller as a
//! typed error and the in-memory view is left untouched.

use crate::error::Result;
use crate::model::{Category, Equipment, JournalEntry, Location, ReferenceSnapshot};

/// Durable backing store for journal entries and reference data.
///
/// Implementations must ensure:
/// - Entry ids are unique (inserting a duplicate id fails)
/// - Entries are never deleted
/// - Each call is atomic: it either fully applies or leaves data unchanged
pub trait JournalBackend: Send {
    // --- Entry operations ---

    /// Load every entry in insertion order.
    fn load_entries(&self) -> Result<Vec<JournalEntry>>;

    /// Persist a new entry.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the id already exists or the write fails.
    fn insert_entry(&mut self, entry: &JournalEntry) -> Result<()>;

    /// Persist the status and cancellation fields of an existing entry.
    ///
    /// # Errors
    ///
    /// Returns `ShiftlogError::EntryNotFound` if the id is unknown.
    fn update_entry(&mut self, entry: &JournalEntry) -> Result<()>;

    // --- Reference data operations ---

    /// Load all categories, equipment and locations (active or not).
    fn load_references(&self) -> Result<ReferenceSnapshot>;

    fn insert_category(&mut self, category: &Category) -> Result<()>;

    fn update_category(&mut self, category: &Category) -> Result<()>;

    fn insert_equipment(&mut self, equipment: &Equipment) -> Result<()>;

    fn update_equipment(&mut self, equipment: &Equipment) -> Result<()>;

    fn insert_location(&mut self, location: &Location) -> Result<()>;

    fn update_location(&mut self, location: &Location) -> Result<()>;

    // --- Maintenance operations ---

    /// Verify stored data satisfies the journal invariants.
    fn check_integrity(&self) -> Result<()>;
}
