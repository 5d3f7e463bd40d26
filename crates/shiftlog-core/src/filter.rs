//! Entry filtering.
//!
//! [`apply`] is a pure, order-preserving filter: every present field of
//! [`FilterOptions`] must match (logical AND), absent fields match anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entry::{EntryCategory, EntryStatus, JournalEntry, Priority};

/// Optional filter criteria for journal entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EntryCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Start of the event time range (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,

    /// End of the event time range (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,

    /// Case-insensitive substring of title or description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: EntryCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn date_from(mut self, date: DateTime<Utc>) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: DateTime<Utc>) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn equipment(mut self, id: Uuid) -> Self {
        self.equipment_id = Some(id);
        self
    }

    pub fn location(mut self, id: Uuid) -> Self {
        self.location_id = Some(id);
        self
    }

    pub fn category_ref(mut self, id: Uuid) -> Self {
        self.category_id = Some(id);
        self
    }

    /// True when no criterion is set. An empty search string counts as unset.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.search_needle().is_none()
            && self.equipment_id.is_none()
            && self.location_id.is_none()
            && self.category_id.is_none()
    }

    fn search_needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether a single entry satisfies every present criterion.
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        self.matches_with(entry, self.search_needle().as_deref())
    }

    fn matches_with(&self, entry: &JournalEntry, needle: Option<&str>) -> bool {
        if self.category.is_some_and(|c| c != entry.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != entry.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != entry.priority) {
            return false;
        }
        if self.date_from.is_some_and(|from| entry.timestamp < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| entry.timestamp > to) {
            return false;
        }
        if !reference_matches(self.equipment_id, entry.equipment_id)
            || !reference_matches(self.location_id, entry.location_id)
            || !reference_matches(self.category_id, entry.category_id)
        {
            return false;
        }
        if let Some(needle) = needle {
            // Fields are searched separately so a match never spans both.
            if !entry.title.to_lowercase().contains(needle)
                && !entry.description.to_lowercase().contains(needle)
            {
                return false;
            }
        }
        true
    }

    /// Short `key=value` descriptions of the present criteria, for headers.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(category) = self.category {
            parts.push(format!("category={}", category));
        }
        if let Some(status) = self.status {
            parts.push(format!("status={}", status));
        }
        if let Some(priority) = self.priority {
            parts.push(format!("priority={}", priority));
        }
        if let Some(from) = self.date_from {
            parts.push(format!("from={}", from.to_rfc3339()));
        }
        if let Some(to) = self.date_to {
            parts.push(format!("to={}", to.to_rfc3339()));
        }
        if let Some(needle) = self.search_needle() {
            parts.push(format!("search=\"{}\"", needle));
        }
        if let Some(id) = self.equipment_id {
            parts.push(format!("equipment={}", id));
        }
        if let Some(id) = self.location_id {
            parts.push(format!("location={}", id));
        }
        if let Some(id) = self.category_id {
            parts.push(format!("category_ref={}", id));
        }
        parts
    }
}

fn reference_matches(wanted: Option<Uuid>, actual: Option<Uuid>) -> bool {
    match wanted {
        None => true,
        Some(id) => actual == Some(id),
    }
}

/// Select the entries matching `filters`, preserving input order.
pub fn apply(entries: &[JournalEntry], filters: &FilterOptions) -> Vec<JournalEntry> {
    if filters.is_empty() {
        return entries.to_vec();
    }
    let needle = filters.search_needle();
    entries
        .iter()
        .filter(|entry| filters.matches_with(entry, needle.as_deref()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(title: &str, description: &str, hour: u32) -> JournalEntry {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap();
        JournalEntry {
            id: Uuid::now_v7(),
            category: EntryCategory::EquipmentWork,
            title: title.to_string(),
            description: description.to_string(),
            timestamp,
            author: "Ivanov".to_string(),
            status: EntryStatus::Active,
            priority: Priority::Medium,
            equipment_id: None,
            location_id: None,
            category_id: None,
            cancellation: None,
            created_at: timestamp,
        }
    }

    #[test]
    fn test_empty_filter_returns_input() {
        let entries = vec![entry("b", "x", 2), entry("a", "y", 1)];
        assert_eq!(apply(&entries, &FilterOptions::new()), entries);
    }

    #[test]
    fn test_blank_search_counts_as_empty() {
        assert!(FilterOptions::new().search("   ").is_empty());
        assert!(!FilterOptions::new().search("x").is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_over_both_fields() {
        let entries = vec![
            entry("Breaker FAULT", "tripped", 1),
            entry("Routine", "found a fault in relay", 2),
            entry("Routine", "nothing", 3),
        ];
        let result = apply(&entries, &FilterOptions::new().search("fault"));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, entries[0].id);
        assert_eq!(result[1].id, entries[1].id);
    }

    #[test]
    fn test_search_handles_cyrillic_case() {
        let entries = vec![entry("Отключение линии", "", 1)];
        let result = apply(&entries, &FilterOptions::new().search("ОТКЛЮЧЕНИЕ"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_search_does_not_span_fields() {
        let entries = vec![entry("line", "trip", 1)];
        assert!(apply(&entries, &FilterOptions::new().search("linetrip")).is_empty());
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let entries = vec![entry("a", "", 1), entry("b", "", 2), entry("c", "", 3)];
        let from = entries[0].timestamp;
        let to = entries[1].timestamp;
        let result = apply(&entries, &FilterOptions::new().date_from(from).date_to(to));
        assert_eq!(result.len(), 2);

        let open_ended = apply(
            &entries,
            &FilterOptions::new().date_from(to + Duration::seconds(1)),
        );
        assert_eq!(open_ended.len(), 1);
        assert_eq!(open_ended[0].title, "c");
    }

    #[test]
    fn test_reference_filter_never_matches_missing_reference() {
        let equipment = Uuid::new_v4();
        let mut with_ref = entry("a", "", 1);
        with_ref.equipment_id = Some(equipment);
        let without_ref = entry("b", "", 2);
        let entries = vec![with_ref.clone(), without_ref];

        let result = apply(&entries, &FilterOptions::new().equipment(equipment));
        assert_eq!(result, vec![with_ref]);
        assert!(apply(&entries, &FilterOptions::new().location(Uuid::new_v4())).is_empty());
    }

    #[test]
    fn test_fields_combine_with_and() {
        let mut critical = entry("Fault", "", 1);
        critical.priority = Priority::Critical;
        let mut cancelled = entry("Fault", "", 2);
        cancelled.priority = Priority::Critical;
        cancelled.status = EntryStatus::Cancelled;
        let entries = vec![critical.clone(), cancelled];

        let result = apply(
            &entries,
            &FilterOptions::new()
                .priority(Priority::Critical)
                .status(EntryStatus::Active),
        );
        assert_eq!(result, vec![critical]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let entries = vec![entry("Fault", "a", 1), entry("b", "fault", 2), entry("c", "", 3)];
        let filters = FilterOptions::new().search("FAULT");
        let once = apply(&entries, &filters);
        assert_eq!(apply(&once, &filters), once);
    }

    #[test]
    fn test_describe_lists_present_fields() {
        let parts = FilterOptions::new()
            .status(EntryStatus::Draft)
            .search("Relay")
            .describe();
        assert_eq!(parts, vec!["status=draft", "search=\"relay\""]);
    }
}
