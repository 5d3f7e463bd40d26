//! Row types for database queries.
//!
//! Rows hold raw column values; `TryFrom` impls parse them into domain
//! types and report malformed data as storage errors.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{Result, ShiftlogError};
use crate::model::{
    Cancellation, Category, EntryCategory, EntryStatus, Equipment, JournalEntry, Location,
    Priority,
};

pub(super) const ENTRY_COLUMNS: &str = "id, category, title, description, timestamp, author, \
     status, priority, equipment_id, location_id, category_id, cancelled_at, cancelled_by, \
     cancel_reason, created_at";

pub(super) const CATEGORY_COLUMNS: &str =
    "id, code, name, description, is_active, sort_order, created_at, updated_at";

pub(super) const NAMED_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| ShiftlogError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

fn parse_optional_uuid(value: Option<&str>, what: &str) -> Result<Option<Uuid>> {
    value.map(|v| parse_uuid(v, what)).transpose()
}

fn parse_timestamp(value: &str, what: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| ShiftlogError::Storage(format!("Invalid {} timestamp: {}", what, e)))?
        .with_timezone(&Utc))
}

fn stored<T: std::str::FromStr<Err = ShiftlogError>>(value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|e: ShiftlogError| ShiftlogError::Storage(format!("Corrupt row: {}", e)))
}

/// Raw row data from the entries table.
#[derive(Debug)]
pub struct EntryRow {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub timestamp: String,
    pub author: String,
    pub status: String,
    pub priority: String,
    pub equipment_id: Option<String>,
    pub location_id: Option<String>,
    pub category_id: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancel_reason: Option<String>,
    pub created_at: String,
}

impl EntryRow {
    /// Read a row selected with [`ENTRY_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            category: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            timestamp: row.get(4)?,
            author: row.get(5)?,
            status: row.get(6)?,
            priority: row.get(7)?,
            equipment_id: row.get(8)?,
            location_id: row.get(9)?,
            category_id: row.get(10)?,
            cancelled_at: row.get(11)?,
            cancelled_by: row.get(12)?,
            cancel_reason: row.get(13)?,
            created_at: row.get(14)?,
        })
    }
}

impl TryFrom<EntryRow> for JournalEntry {
    type Error = ShiftlogError;

    fn try_from(row: EntryRow) -> Result<Self> {
        let cancellation = match (row.cancelled_at, row.cancelled_by, row.cancel_reason) {
            (Some(at), Some(by), Some(reason)) => Some(Cancellation {
                cancelled_at: parse_timestamp(&at, "cancelled_at")?,
                cancelled_by: by,
                reason,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ShiftlogError::Storage(format!(
                    "Entry {} has partial cancellation fields",
                    row.id
                )))
            }
        };

        Ok(JournalEntry {
            id: parse_uuid(&row.id, "entry")?,
            category: stored::<EntryCategory>(&row.category)?,
            title: row.title,
            description: row.description,
            timestamp: parse_timestamp(&row.timestamp, "entry")?,
            author: row.author,
            status: stored::<EntryStatus>(&row.status)?,
            priority: stored::<Priority>(&row.priority)?,
            equipment_id: parse_optional_uuid(row.equipment_id.as_deref(), "equipment")?,
            location_id: parse_optional_uuid(row.location_id.as_deref(), "location")?,
            category_id: parse_optional_uuid(row.category_id.as_deref(), "category")?,
            cancellation,
            created_at: parse_timestamp(&row.created_at, "created_at")?,
        })
    }
}

/// Raw row data from the categories table.
#[derive(Debug)]
pub struct CategoryRow {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl CategoryRow {
    /// Read a row selected with [`CATEGORY_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            is_active: row.get(4)?,
            sort_order: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = ShiftlogError;

    fn try_from(row: CategoryRow) -> Result<Self> {
        Ok(Category {
            id: parse_uuid(&row.id, "category")?,
            code: row.code,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
        })
    }
}

/// Raw row data from the equipment and locations tables (same shape).
#[derive(Debug)]
pub struct NamedRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl NamedRow {
    /// Read a row selected with [`NAMED_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            is_active: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl TryFrom<NamedRow> for Equipment {
    type Error = ShiftlogError;

    fn try_from(row: NamedRow) -> Result<Self> {
        Ok(Equipment {
            id: parse_uuid(&row.id, "equipment")?,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
        })
    }
}

impl TryFrom<NamedRow> for Location {
    type Error = ShiftlogError;

    fn try_from(row: NamedRow) -> Result<Self> {
        Ok(Location {
            id: parse_uuid(&row.id, "location")?,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
        })
    }
}
