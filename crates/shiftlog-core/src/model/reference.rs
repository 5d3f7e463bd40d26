//! Reference data: categories, equipment and locations.
//!
//! Reference records are shared lookup data owned by their managers
//! (see [`crate::references`]). Entries only hold their ids; display code
//! resolves them through an explicit join against a [`ReferenceSnapshot`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ShiftlogError};
use crate::model::entry::JournalEntry;

/// Which reference table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Category,
    Equipment,
    Location,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Equipment => "equipment",
            Self::Location => "location",
        }
    }
}

impl ReferenceKind {
    /// Capitalized form for the start of a message.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Equipment => "Equipment",
            Self::Location => "Location",
        }
    }
}

/// Record names and category codes compare trimmed and Unicode case-folded,
/// so "Подстанция 1" and "подстанция 1" are the same record.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common view over the three reference record types.
pub trait ReferenceRecord {
    const KIND: ReferenceKind;

    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn is_active(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,

    /// Short unique code (e.g. "RZA")
    pub code: String,

    pub name: String,

    pub description: Option<String>,

    pub is_active: bool,

    /// Display ordering, ascending
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReferenceRecord for Category {
    const KIND: ReferenceKind = ReferenceKind::Category;

    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl ReferenceRecord for Equipment {
    const KIND: ReferenceKind = ReferenceKind::Equipment;

    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl ReferenceRecord for Location {
    const KIND: ReferenceKind = ReferenceKind::Location;

    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Builder for creating new categories.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl NewCategory {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            sort_order: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Builder for creating equipment and location records.
#[derive(Debug, Clone)]
pub struct NewNamedRecord {
    pub name: String,
    pub description: Option<String>,
}

impl NewNamedRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for any reference record. Absent fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct ReferenceUpdate {
    pub name: Option<String>,

    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,

    /// Ignored for equipment and locations
    pub sort_order: Option<i32>,
}

impl ReferenceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.sort_order.is_none()
    }
}

/// Point-in-time copy of all reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    pub categories: Vec<Category>,
    pub equipment: Vec<Equipment>,
    pub locations: Vec<Location>,
}

impl ReferenceSnapshot {
    pub fn category(&self, id: &Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == *id)
    }

    pub fn equipment(&self, id: &Uuid) -> Option<&Equipment> {
        self.equipment.iter().find(|e| e.id == *id)
    }

    pub fn location(&self, id: &Uuid) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == *id)
    }

    /// Categories offered for new entries, by `sort_order` then name.
    pub fn active_categories(&self) -> Vec<&Category> {
        let mut active = self.all_categories();
        active.retain(|c| c.is_active);
        active
    }

    /// Equipment offered for new entries, by name.
    pub fn active_equipment(&self) -> Vec<&Equipment> {
        by_name(&self.equipment, true)
    }

    /// Locations offered for new entries, by name.
    pub fn active_locations(&self) -> Vec<&Location> {
        by_name(&self.locations, true)
    }

    /// Every category, inactive included, by `sort_order` then name.
    pub fn all_categories(&self) -> Vec<&Category> {
        let mut all: Vec<&Category> = self.categories.iter().collect();
        all.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        all
    }

    /// Every equipment record, inactive included, by name.
    pub fn all_equipment(&self) -> Vec<&Equipment> {
        by_name(&self.equipment, false)
    }

    /// Every location, inactive included, by name.
    pub fn all_locations(&self) -> Vec<&Location> {
        by_name(&self.locations, false)
    }

    /// Validate the optional references of a new entry.
    ///
    /// Every referenced record must exist and be active; inactive records stay
    /// valid on existing entries but cannot be attached to new ones.
    pub fn check_new_references(
        &self,
        equipment_id: Option<Uuid>,
        location_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> Result<()> {
        if let Some(id) = equipment_id {
            require_active(self.equipment(&id), &id)?;
        }
        if let Some(id) = location_id {
            require_active(self.location(&id), &id)?;
        }
        if let Some(id) = category_id {
            require_active(self.category(&id), &id)?;
        }
        Ok(())
    }

    /// Join an entry with its reference records for display.
    pub fn resolve<'a>(&'a self, entry: &'a JournalEntry) -> ResolvedEntry<'a> {
        ResolvedEntry {
            entry,
            equipment: entry.equipment_id.and_then(|id| self.equipment(&id)),
            location: entry.location_id.and_then(|id| self.location(&id)),
            category: entry.category_id.and_then(|id| self.category(&id)),
        }
    }
}

fn require_active<R: ReferenceRecord>(record: Option<&R>, id: &Uuid) -> Result<()> {
    match record {
        None => Err(ShiftlogError::Validation(format!(
            "Unknown {}: {}",
            R::KIND,
            id
        ))),
        Some(record) if !record.is_active() => Err(ShiftlogError::Validation(format!(
            "{} \"{}\" is inactive and cannot be used for new entries",
            R::KIND,
            record.name()
        ))),
        Some(_) => Ok(()),
    }
}

/// An entry joined with the reference records it points at.
///
/// A reference whose record is missing from the snapshot resolves to `None`.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEntry<'a> {
    pub entry: &'a JournalEntry,
    pub equipment: Option<&'a Equipment>,
    pub location: Option<&'a Location>,
    pub category: Option<&'a Category>,
}

impl ResolvedEntry<'_> {
    pub fn equipment_name(&self) -> Option<&str> {
        self.equipment.map(|e| e.name.as_str())
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location.map(|l| l.name.as_str())
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.map(|c| c.name.as_str())
    }
}

fn by_name<R: ReferenceRecord>(records: &[R], active_only: bool) -> Vec<&R> {
    let mut out: Vec<&R> = records
        .iter()
        .filter(|r| !active_only || r.is_active())
        .collect();
    out.sort_by(|a, b| a.name().cmp(b.name()));
    out
}
