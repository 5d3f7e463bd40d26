//! Reference data management.
//!
//! [`ReferenceManager`] is the only writer of categories, equipment and
//! locations. Records are never deleted; they are deactivated instead, which
//! hides them from new entries while existing entries keep resolving them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, ShiftlogError};
use crate::model::entry::require_text;
use crate::model::{
    same_name, Category, Equipment, Location, NewCategory, NewNamedRecord, ReferenceRecord,
    ReferenceSnapshot, ReferenceUpdate,
};
use crate::storage::JournalBackend;

/// A reference record type the manager can edit and persist.
pub trait ManagedRecord: ReferenceRecord + Clone {
    /// This record type's slice of the snapshot.
    fn records(snapshot: &ReferenceSnapshot) -> &[Self];

    /// Listing order.
    fn order(a: &Self, b: &Self) -> Ordering;

    /// Apply the present fields of `update`.
    fn apply(&mut self, update: &ReferenceUpdate, now: DateTime<Utc>);

    fn set_active(&mut self, active: bool, now: DateTime<Utc>);

    fn persist_update<B: JournalBackend + ?Sized>(&self, backend: &mut B) -> Result<()>;
}

fn apply_common(
    name: &mut String,
    description: &mut Option<String>,
    updated_at: &mut DateTime<Utc>,
    update: &ReferenceUpdate,
    now: DateTime<Utc>,
) {
    if let Some(new_name) = &update.name {
        *name = new_name.trim().to_string();
    }
    if let Some(new_description) = &update.description {
        *description = clean_description(new_description.as_deref());
    }
    *updated_at = now;
}

fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

impl ManagedRecord for Category {
    fn records(snapshot: &ReferenceSnapshot) -> &[Self] {
        &snapshot.categories
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    }

    fn apply(&mut self, update: &ReferenceUpdate, now: DateTime<Utc>) {
        apply_common(
            &mut self.name,
            &mut self.description,
            &mut self.updated_at,
            update,
            now,
        );
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
    }

    fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.is_active = active;
        self.updated_at = now;
    }

    fn persist_update<B: JournalBackend + ?Sized>(&self, backend: &mut B) -> Result<()> {
        backend.update_category(self)
    }
}

impl ManagedRecord for Equipment {
    fn records(snapshot: &ReferenceSnapshot) -> &[Self] {
        &snapshot.equipment
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name)
    }

    fn apply(&mut self, update: &ReferenceUpdate, now: DateTime<Utc>) {
        apply_common(
            &mut self.name,
            &mut self.description,
            &mut self.updated_at,
            update,
            now,
        );
    }

    fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.is_active = active;
        self.updated_at = now;
    }

    fn persist_update<B: JournalBackend + ?Sized>(&self, backend: &mut B) -> Result<()> {
        backend.update_equipment(self)
    }
}

impl ManagedRecord for Location {
    fn records(snapshot: &ReferenceSnapshot) -> &[Self] {
        &snapshot.locations
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name)
    }

    fn apply(&mut self, update: &ReferenceUpdate, now: DateTime<Utc>) {
        apply_common(
            &mut self.name,
            &mut self.description,
            &mut self.updated_at,
            update,
            now,
        );
    }

    fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.is_active = active;
        self.updated_at = now;
    }

    fn persist_update<B: JournalBackend + ?Sized>(&self, backend: &mut B) -> Result<()> {
        backend.update_location(self)
    }
}

/// Create, edit, deactivate and list reference records through a backend.
pub struct ReferenceManager<'a, B: JournalBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: JournalBackend + ?Sized> ReferenceManager<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    fn snapshot(&self) -> Result<ReferenceSnapshot> {
        self.backend.load_references()
    }

    /// Create an active category.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank code or name, or a code already in use
    /// (compared case-insensitively).
    pub fn create_category(&mut self, new: NewCategory) -> Result<Category> {
        require_text("Code", &new.code)?;
        require_text("Name", &new.name)?;
        let code = new.code.trim().to_string();

        let snapshot = self.snapshot()?;
        if snapshot
            .categories
            .iter()
            .any(|c| same_name(&c.code, &code))
        {
            return Err(ShiftlogError::Validation(format!(
                "Category code \"{}\" is already in use",
                code
            )));
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(),
            code,
            name: new.name.trim().to_string(),
            description: clean_description(new.description.as_deref()),
            is_active: true,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        };
        self.backend.insert_category(&category)?;
        tracing::info!(
            target: "shiftlog",
            event = "category_created",
            id = %category.id,
            code = %category.code
        );
        Ok(category)
    }

    /// Create an active equipment record. Names are unique, ignoring case.
    pub fn create_equipment(&mut self, new: NewNamedRecord) -> Result<Equipment> {
        let name = self.unique_new_name::<Equipment>(&new.name)?;
        let now = Utc::now();
        let equipment = Equipment {
            id: Uuid::now_v7(),
            name,
            description: clean_description(new.description.as_deref()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.backend.insert_equipment(&equipment)?;
        tracing::info!(target: "shiftlog", event = "equipment_created", id = %equipment.id);
        Ok(equipment)
    }

    /// Create an active location. Names are unique, ignoring case.
    pub fn create_location(&mut self, new: NewNamedRecord) -> Result<Location> {
        let name = self.unique_new_name::<Location>(&new.name)?;
        let now = Utc::now();
        let location = Location {
            id: Uuid::now_v7(),
            name,
            description: clean_description(new.description.as_deref()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.backend.insert_location(&location)?;
        tracing::info!(target: "shiftlog", event = "location_created", id = %location.id);
        Ok(location)
    }

    fn unique_new_name<R: ManagedRecord>(&self, name: &str) -> Result<String> {
        require_text("Name", name)?;
        let name = name.trim().to_string();
        let snapshot = self.snapshot()?;
        ensure_name_free::<R>(&snapshot, &name, None)?;
        Ok(name)
    }

    /// Edit name, description or (categories only) sort order.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `Validation` for an empty update, a
    /// blank name or a name already used by another record of the same kind.
    pub fn update<R: ManagedRecord>(&mut self, id: &Uuid, update: &ReferenceUpdate) -> Result<R> {
        if update.is_empty() {
            return Err(ShiftlogError::Validation("Nothing to update".to_string()));
        }
        if let Some(name) = &update.name {
            require_text("Name", name)?;
        }

        let snapshot = self.snapshot()?;
        let mut record = find::<R>(&snapshot, id)?;
        if let Some(name) = &update.name {
            ensure_name_free::<R>(&snapshot, name.trim(), Some(*id))?;
        }

        record.apply(update, Utc::now());
        record.persist_update(&mut *self.backend)?;
        tracing::info!(target: "shiftlog", event = "reference_updated", kind = %R::KIND, id = %id);
        Ok(record)
    }

    /// Hide a record from new entries.
    pub fn deactivate<R: ManagedRecord>(&mut self, id: &Uuid) -> Result<R> {
        self.set_active::<R>(id, false)
    }

    /// Offer a deactivated record for new entries again.
    pub fn reactivate<R: ManagedRecord>(&mut self, id: &Uuid) -> Result<R> {
        self.set_active::<R>(id, true)
    }

    fn set_active<R: ManagedRecord>(&mut self, id: &Uuid, active: bool) -> Result<R> {
        let snapshot = self.snapshot()?;
        let mut record = find::<R>(&snapshot, id)?;
        if record.is_active() == active {
            return Err(ShiftlogError::InvalidState(format!(
                "{} \"{}\" is already {}",
                R::KIND.title(),
                record.name(),
                if active { "active" } else { "inactive" }
            )));
        }

        record.set_active(active, Utc::now());
        record.persist_update(&mut *self.backend)?;
        tracing::info!(
            target: "shiftlog",
            event = "reference_activation_changed",
            kind = %R::KIND,
            id = %id,
            active
        );
        Ok(record)
    }

    /// Records of one kind in listing order, optionally only active ones.
    pub fn list<R: ManagedRecord>(&self, active_only: bool) -> Result<Vec<R>> {
        let snapshot = self.snapshot()?;
        let mut records: Vec<R> = R::records(&snapshot)
            .iter()
            .filter(|record| !active_only || record.is_active())
            .cloned()
            .collect();
        records.sort_by(R::order);
        Ok(records)
    }
}

fn find<R: ManagedRecord>(snapshot: &ReferenceSnapshot, id: &Uuid) -> Result<R> {
    R::records(snapshot)
        .iter()
        .find(|record| record.id() == *id)
        .cloned()
        .ok_or_else(|| ShiftlogError::NotFound(format!("{} {}", R::KIND, id)))
}

fn ensure_name_free<R: ManagedRecord>(
    snapshot: &ReferenceSnapshot,
    name: &str,
    except: Option<Uuid>,
) -> Result<()> {
    let taken = R::records(snapshot)
        .iter()
        .filter(|record| Some(record.id()) != except)
        .any(|record| same_name(record.name(), name));
    if taken {
        return Err(ShiftlogError::Validation(format!(
            "{} named \"{}\" already exists",
            R::KIND.title(),
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    #[test]
    fn test_category_codes_are_unique_ignoring_case() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        manager
            .create_category(NewCategory::new("RZA", "Relay protection"))
            .unwrap();
        let err = manager
            .create_category(NewCategory::new("rza", "Duplicate"))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_cyrillic_names_are_unique_ignoring_case() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        manager
            .create_equipment(NewNamedRecord::new("Подстанция 1"))
            .unwrap();
        let err = manager
            .create_equipment(NewNamedRecord::new("подстанция 1"))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err
            .to_string()
            .contains("Equipment named \"подстанция 1\" already exists"));

        manager
            .create_category(NewCategory::new("РЗА", "Релейная защита"))
            .unwrap();
        assert!(manager
            .create_category(NewCategory::new("рза", "Дубликат"))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_toggle_message_names_kind() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        let location = manager
            .create_location(NewNamedRecord::new("Substation 4"))
            .unwrap();
        let err = manager.reactivate::<Location>(&location.id).unwrap_err();
        assert_eq!(
            err.to_string(),
            ShiftlogError::InvalidState("Location \"Substation 4\" is already active".into())
                .to_string()
        );
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        assert!(manager
            .create_equipment(NewNamedRecord::new("   "))
            .unwrap_err()
            .is_validation());
        assert!(manager
            .create_category(NewCategory::new("", "Name"))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_list_orders_and_filters() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        let late = manager
            .create_category(NewCategory::new("B", "Beta").with_sort_order(5))
            .unwrap();
        manager
            .create_category(NewCategory::new("A", "Alpha").with_sort_order(1))
            .unwrap();
        manager.deactivate::<Category>(&late.id).unwrap();

        let all: Vec<String> = manager
            .list::<Category>(false)
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(all, vec!["A", "B"]);
        assert_eq!(manager.list::<Category>(true).unwrap().len(), 1);
    }

    #[test]
    fn test_update_renames_and_clears_description() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        let location = manager
            .create_location(NewNamedRecord::new("Substation 1").with_description("North"))
            .unwrap();

        let updated: Location = manager
            .update(
                &location.id,
                &ReferenceUpdate::new().name("Substation 1A").description(None),
            )
            .unwrap();
        assert_eq!(updated.name, "Substation 1A");
        assert!(updated.description.is_none());
        assert!(updated.updated_at >= location.updated_at);
    }

    #[test]
    fn test_update_rejects_taken_name_and_empty_update() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        manager.create_equipment(NewNamedRecord::new("T-1")).unwrap();
        let t2 = manager.create_equipment(NewNamedRecord::new("T-2")).unwrap();

        let err = manager
            .update::<Equipment>(&t2.id, &ReferenceUpdate::new().name("t-1"))
            .unwrap_err();
        assert!(err.is_validation());

        let err = manager
            .update::<Equipment>(&t2.id, &ReferenceUpdate::new())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_deactivate_twice_is_invalid_state() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        let equipment = manager.create_equipment(NewNamedRecord::new("Breaker Q1")).unwrap();
        manager.deactivate::<Equipment>(&equipment.id).unwrap();
        assert!(manager
            .deactivate::<Equipment>(&equipment.id)
            .unwrap_err()
            .is_invalid_state());
        let back = manager.reactivate::<Equipment>(&equipment.id).unwrap();
        assert!(back.is_active);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut backend = MemoryBackend::new();
        let mut manager = ReferenceManager::new(&mut backend);
        assert!(manager
            .deactivate::<Location>(&Uuid::new_v4())
            .unwrap_err()
            .is_not_found());
    }
}
