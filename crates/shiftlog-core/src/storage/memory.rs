//! In-process backend.
//!
//! Keeps everything in vectors. Useful for tests and for embedding the store
//! where durability is handled elsewhere.

use crate::error::{Result, ShiftlogError};
use crate::model::{same_name, Category, Equipment, JournalEntry, Location, ReferenceSnapshot};
use crate::storage::traits::JournalBackend;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Vec<JournalEntry>,
    references: ReferenceSnapshot,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing reference data.
    pub fn with_references(references: ReferenceSnapshot) -> Self {
        Self {
            entries: Vec::new(),
            references,
        }
    }

    /// Number of persisted entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

fn replace_by_id<T: Clone>(
    items: &mut [T],
    item: &T,
    id_of: impl Fn(&T) -> uuid::Uuid,
    what: &str,
) -> Result<()> {
    let id = id_of(item);
    let slot = items
        .iter_mut()
        .find(|existing| id_of(existing) == id)
        .ok_or_else(|| ShiftlogError::NotFound(format!("{} {}", what, id)))?;
    *slot = item.clone();
    Ok(())
}

impl JournalBackend for MemoryBackend {
    fn load_entries(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.entries.clone())
    }

    fn insert_entry(&mut self, entry: &JournalEntry) -> Result<()> {
        if self.entries.iter().any(|existing| existing.id == entry.id) {
            return Err(ShiftlogError::Storage(format!(
                "Duplicate entry id {}",
                entry.id
            )));
        }
        self.entries.push(entry.clone());
        Ok(())
    }

    fn update_entry(&mut self, entry: &JournalEntry) -> Result<()> {
        let existing = self
            .entries
            .iter_mut()
            .find(|existing| existing.id == entry.id)
            .ok_or(ShiftlogError::EntryNotFound(entry.id))?;
        existing.status = entry.status;
        existing.cancellation = entry.cancellation.clone();
        Ok(())
    }

    fn load_references(&self) -> Result<ReferenceSnapshot> {
        Ok(self.references.clone())
    }

    fn insert_category(&mut self, category: &Category) -> Result<()> {
        if self
            .references
            .categories
            .iter()
            .any(|c| same_name(&c.code, &category.code))
        {
            return Err(ShiftlogError::Storage(format!(
                "Duplicate category code {}",
                category.code
            )));
        }
        self.references.categories.push(category.clone());
        Ok(())
    }

    fn update_category(&mut self, category: &Category) -> Result<()> {
        replace_by_id(&mut self.references.categories, category, |c| c.id, "category")
    }

    fn insert_equipment(&mut self, equipment: &Equipment) -> Result<()> {
        self.references.equipment.push(equipment.clone());
        Ok(())
    }

    fn update_equipment(&mut self, equipment: &Equipment) -> Result<()> {
        replace_by_id(&mut self.references.equipment, equipment, |e| e.id, "equipment")
    }

    fn insert_location(&mut self, location: &Location) -> Result<()> {
        self.references.locations.push(location.clone());
        Ok(())
    }

    fn update_location(&mut self, location: &Location) -> Result<()> {
        replace_by_id(&mut self.references.locations, location, |l| l.id, "location")
    }

    fn check_integrity(&self) -> Result<()> {
        if let Some(entry) = self.entries.iter().find(|e| !e.is_consistent()) {
            return Err(ShiftlogError::Storage(format!(
                "Entry {} has inconsistent cancellation fields",
                entry.id
            )));
        }
        Ok(())
    }
}
