//! Journal entry types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ShiftlogError};

/// Operational category of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCategory {
    EquipmentWork,
    RelayProtection,
    TeamPermits,
    Emergency,
    NetworkOutages,
    Other,
}

impl EntryCategory {
    /// All categories in display order.
    pub const ALL: [EntryCategory; 6] = [
        EntryCategory::EquipmentWork,
        EntryCategory::RelayProtection,
        EntryCategory::TeamPermits,
        EntryCategory::Emergency,
        EntryCategory::NetworkOutages,
        EntryCategory::Other,
    ];

    /// Stable wire name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EquipmentWork => "equipment_work",
            Self::RelayProtection => "relay_protection",
            Self::TeamPermits => "team_permits",
            Self::Emergency => "emergency",
            Self::NetworkOutages => "network_outages",
            Self::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EquipmentWork => "Equipment work",
            Self::RelayProtection => "Relay protection",
            Self::TeamPermits => "Team permits",
            Self::Emergency => "Emergency",
            Self::NetworkOutages => "Network outages",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryCategory {
    type Err = ShiftlogError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        if normalized.is_empty() {
            return Err(ShiftlogError::Validation(
                "Category is required".to_string(),
            ));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ShiftlogError::Validation(format!("Unknown category: {}", value)))
    }
}

/// Lifecycle status of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    Active,
    Cancelled,
}

impl EntryStatus {
    pub const ALL: [EntryStatus; 3] = [
        EntryStatus::Draft,
        EntryStatus::Active,
        EntryStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = ShiftlogError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            // Accept the American spelling as well.
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ShiftlogError::Validation(format!(
                "Unknown status: {}",
                value
            ))),
        }
    }
}

/// Operational priority. Ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ShiftlogError;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|priority| priority.as_str() == normalized)
            .ok_or_else(|| ShiftlogError::Validation(format!("Unknown priority: {}", value)))
    }
}

/// Audit record attached to a cancelled entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// When the entry was cancelled
    pub cancelled_at: DateTime<Utc>,

    /// Display name of the operator who cancelled it
    pub cancelled_by: String,

    /// Free-text reason, never empty
    pub reason: String,
}

/// A journal entry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    pub category: EntryCategory,

    pub title: String,

    pub description: String,

    /// Event time (as reported by the operator)
    pub timestamp: DateTime<Utc>,

    /// Display name of the author
    pub author: String,

    pub status: EntryStatus,

    pub priority: Priority,

    /// Optional reference to an equipment record
    pub equipment_id: Option<Uuid>,

    /// Optional reference to a location record
    pub location_id: Option<Uuid>,

    /// Optional reference to a category record
    pub category_id: Option<Uuid>,

    /// Present if and only if `status == Cancelled`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<Cancellation>,

    /// When this record was written
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Cancellation fields are set exactly when the entry is cancelled.
    pub fn is_consistent(&self) -> bool {
        (self.status == EntryStatus::Cancelled) == self.cancellation.is_some()
    }

    /// Critical and still operationally live.
    pub fn is_critical_active(&self) -> bool {
        self.priority == Priority::Critical && self.status == EntryStatus::Active
    }
}

/// Builder for creating new entries.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub category: EntryCategory,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub priority: Priority,

    /// Requested initial status; `Active` unless the caller asks for a draft
    pub status: EntryStatus,

    pub equipment_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl NewEntry {
    pub fn new(
        category: EntryCategory,
        title: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            category,
            title: title.into(),
            description: description.into(),
            timestamp: Utc::now(),
            author: author.into(),
            priority,
            status: EntryStatus::Active,
            equipment_id: None,
            location_id: None,
            category_id: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn as_draft(mut self) -> Self {
        self.status = EntryStatus::Draft;
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_equipment(mut self, id: Uuid) -> Self {
        self.equipment_id = Some(id);
        self
    }

    pub fn with_location(mut self, id: Uuid) -> Self {
        self.location_id = Some(id);
        self
    }

    pub fn with_category_ref(mut self, id: Uuid) -> Self {
        self.category_id = Some(id);
        self
    }

    /// Check the required text fields.
    pub fn validate(&self) -> Result<()> {
        require_text("Title", &self.title)?;
        require_text("Description", &self.description)?;
        require_text("Author", &self.author)?;
        Ok(())
    }
}

/// Reject empty or whitespace-only text.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ShiftlogError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "relay_protection".parse::<EntryCategory>().unwrap(),
            EntryCategory::RelayProtection
        );
        assert_eq!(
            "Network-Outages".parse::<EntryCategory>().unwrap(),
            EntryCategory::NetworkOutages
        );
        assert!(matches!(
            "".parse::<EntryCategory>(),
            Err(ShiftlogError::Validation(_))
        ));
        assert!(matches!(
            "weather".parse::<EntryCategory>(),
            Err(ShiftlogError::Validation(_))
        ));
    }

    #[test]
    fn test_priority_parse_and_order() {
        assert_eq!("CRITICAL".parse::<Priority>().unwrap(), Priority::Critical);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::Low < Priority::Medium);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("canceled".parse::<EntryStatus>().unwrap(), EntryStatus::Cancelled);
        assert_eq!("Draft".parse::<EntryStatus>().unwrap(), EntryStatus::Draft);
        assert!("archived".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for category in EntryCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
        assert_eq!(
            serde_json::to_string(&EntryStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn test_new_entry_builder() {
        let equipment = Uuid::new_v4();
        let entry = NewEntry::new(
            EntryCategory::Emergency,
            "Fault",
            "Line trip",
            "Ivanov",
            Priority::Critical,
        )
        .with_equipment(equipment)
        .as_draft();

        assert_eq!(entry.status, EntryStatus::Draft);
        assert_eq!(entry.equipment_id, Some(equipment));
        assert!(entry.location_id.is_none());
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_new_entry_defaults_to_active() {
        let entry = NewEntry::new(
            EntryCategory::Other,
            "Shift handover",
            "All quiet",
            "Petrov",
            Priority::Low,
        );
        assert_eq!(entry.status, EntryStatus::Active);
    }

    #[test]
    fn test_new_entry_rejects_blank_fields() {
        let entry = NewEntry::new(EntryCategory::Other, "  ", "body", "Petrov", Priority::Low);
        assert!(matches!(entry.validate(), Err(ShiftlogError::Validation(_))));

        let entry = NewEntry::new(EntryCategory::Other, "t", "body", "", Priority::Low);
        assert!(matches!(entry.validate(), Err(ShiftlogError::Validation(_))));
    }
}
