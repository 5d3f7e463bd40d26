//! Summary statistics over a set of entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::entry::{EntryCategory, EntryStatus, JournalEntry, Priority};

/// Counts by status, plus live critical entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub drafts: usize,
    pub cancelled: usize,

    /// Critical entries that are still active; drafts and cancelled are excluded
    pub critical: usize,
}

/// Count entries by status and live critical priority.
pub fn summarize(entries: &[JournalEntry]) -> Summary {
    let mut summary = Summary {
        total: entries.len(),
        ..Summary::default()
    };
    for entry in entries {
        match entry.status {
            EntryStatus::Active => summary.active += 1,
            EntryStatus::Draft => summary.drafts += 1,
            EntryStatus::Cancelled => summary.cancelled += 1,
        }
        if entry.is_critical_active() {
            summary.critical += 1;
        }
    }
    summary
}

/// Entry counts per category. Categories with no entries are omitted.
pub fn by_category(entries: &[JournalEntry]) -> BTreeMap<EntryCategory, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.category).or_insert(0) += 1;
    }
    counts
}

/// Entry counts per priority. Priorities with no entries are omitted.
pub fn by_priority(entries: &[JournalEntry]) -> BTreeMap<Priority, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.priority).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(status: EntryStatus, priority: Priority, category: EntryCategory) -> JournalEntry {
        let now = Utc::now();
        JournalEntry {
            id: Uuid::now_v7(),
            category,
            title: "t".to_string(),
            description: "d".to_string(),
            timestamp: now,
            author: "Ivanov".to_string(),
            status,
            priority,
            equipment_id: None,
            location_id: None,
            category_id: None,
            cancellation: None,
            created_at: now,
        }
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn test_summarize_counts_partition_total() {
        let entries = vec![
            entry(EntryStatus::Active, Priority::Critical, EntryCategory::Emergency),
            entry(EntryStatus::Draft, Priority::Critical, EntryCategory::Emergency),
            entry(EntryStatus::Cancelled, Priority::Critical, EntryCategory::Other),
            entry(EntryStatus::Active, Priority::Low, EntryCategory::Other),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.drafts, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.critical, 1);
        assert_eq!(
            summary.total,
            summary.active + summary.drafts + summary.cancelled
        );
    }

    #[test]
    fn test_breakdowns() {
        let entries = vec![
            entry(EntryStatus::Active, Priority::High, EntryCategory::Emergency),
            entry(EntryStatus::Active, Priority::High, EntryCategory::Emergency),
            entry(EntryStatus::Draft, Priority::Low, EntryCategory::TeamPermits),
        ];
        let categories = by_category(&entries);
        assert_eq!(categories.get(&EntryCategory::Emergency), Some(&2));
        assert_eq!(categories.get(&EntryCategory::TeamPermits), Some(&1));
        assert_eq!(categories.get(&EntryCategory::Other), None);

        let priorities = by_priority(&entries);
        assert_eq!(priorities.get(&Priority::High), Some(&2));
        assert_eq!(priorities.get(&Priority::Low), Some(&1));
    }
}
