//! Entry lifecycle state machine.
//!
//! ```text
//!   draft ──activate──▶ active
//!     │                   │
//!     └──cancel──▶ cancelled ◀──cancel──┘
//! ```
//!
//! Entries start as `draft` or `active`. `cancelled` is terminal. Nothing
//! moves an active entry back to draft.

use chrono::{DateTime, Utc};

use crate::error::{Result, ShiftlogError};
use crate::model::entry::{require_text, Cancellation, EntryStatus, JournalEntry};

/// Triggers that drive status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activate,
    Cancel,
}

impl Transition {
    fn verb(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Cancel => "cancel",
        }
    }
}

/// Status reached by applying `transition` to `from`.
pub fn next_status(from: EntryStatus, transition: Transition) -> Result<EntryStatus> {
    match (from, transition) {
        (EntryStatus::Draft, Transition::Activate) => Ok(EntryStatus::Active),
        (EntryStatus::Draft | EntryStatus::Active, Transition::Cancel) => Ok(EntryStatus::Cancelled),
        (EntryStatus::Cancelled, t) => Err(ShiftlogError::InvalidState(format!(
            "Cannot {} a cancelled entry",
            t.verb()
        ))),
        (from, t) => Err(ShiftlogError::InvalidState(format!(
            "Cannot {} an entry in status {}",
            t.verb(),
            from
        ))),
    }
}

/// Entries may only be created as drafts or active.
pub fn ensure_initial(status: EntryStatus) -> Result<()> {
    match status {
        EntryStatus::Draft | EntryStatus::Active => Ok(()),
        EntryStatus::Cancelled => Err(ShiftlogError::Validation(
            "New entries must start as draft or active".to_string(),
        )),
    }
}

/// Produce the cancelled version of `entry`.
///
/// The status check runs before the guard, so cancelling a cancelled entry
/// reports `InvalidState` even when the reason is also empty.
pub fn cancel(
    entry: &JournalEntry,
    reason: &str,
    cancelled_by: &str,
    at: DateTime<Utc>,
) -> Result<JournalEntry> {
    let status = next_status(entry.status, Transition::Cancel)?;
    require_text("Cancel reason", reason)?;
    require_text("Cancelled by", cancelled_by)?;

    let mut cancelled = entry.clone();
    cancelled.status = status;
    cancelled.cancellation = Some(Cancellation {
        cancelled_at: at,
        cancelled_by: cancelled_by.trim().to_string(),
        reason: reason.trim().to_string(),
    });
    Ok(cancelled)
}

/// Produce the activated version of a draft entry.
pub fn activate(entry: &JournalEntry) -> Result<JournalEntry> {
    let status = next_status(entry.status, Transition::Activate)?;
    let mut activated = entry.clone();
    activated.status = status;
    Ok(activated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::{EntryCategory, Priority};
    use uuid::Uuid;

    fn entry(status: EntryStatus) -> JournalEntry {
        let now = Utc::now();
        JournalEntry {
            id: Uuid::now_v7(),
            category: EntryCategory::Emergency,
            title: "Fault".to_string(),
            description: "Line trip".to_string(),
            timestamp: now,
            author: "Ivanov".to_string(),
            status,
            priority: Priority::Critical,
            equipment_id: None,
            location_id: None,
            category_id: None,
            cancellation: None,
            created_at: now,
        }
    }

    #[test]
    fn test_transition_table() {
        use EntryStatus::*;
        assert_eq!(next_status(Draft, Transition::Activate).unwrap(), Active);
        assert_eq!(next_status(Draft, Transition::Cancel).unwrap(), Cancelled);
        assert_eq!(next_status(Active, Transition::Cancel).unwrap(), Cancelled);
        assert!(next_status(Active, Transition::Activate)
            .unwrap_err()
            .is_invalid_state());
        assert!(next_status(Cancelled, Transition::Cancel)
            .unwrap_err()
            .is_invalid_state());
        assert!(next_status(Cancelled, Transition::Activate)
            .unwrap_err()
            .is_invalid_state());
    }

    #[test]
    fn test_initial_status() {
        assert!(ensure_initial(EntryStatus::Draft).is_ok());
        assert!(ensure_initial(EntryStatus::Active).is_ok());
        assert!(ensure_initial(EntryStatus::Cancelled).is_err());
    }

    #[test]
    fn test_cancel_sets_all_fields() {
        let at = Utc::now();
        let cancelled = cancel(&entry(EntryStatus::Active), " False alarm ", "Petrov", at).unwrap();
        assert_eq!(cancelled.status, EntryStatus::Cancelled);
        let cancellation = cancelled.cancellation.as_ref().unwrap();
        assert_eq!(cancellation.reason, "False alarm");
        assert_eq!(cancellation.cancelled_by, "Petrov");
        assert_eq!(cancellation.cancelled_at, at);
        assert!(cancelled.is_consistent());
    }

    #[test]
    fn test_cancel_requires_reason() {
        let result = cancel(&entry(EntryStatus::Draft), "   ", "Petrov", Utc::now());
        assert!(matches!(result, Err(ShiftlogError::Validation(_))));
    }

    #[test]
    fn test_cancel_twice_is_invalid_state_even_without_reason() {
        let first = cancel(&entry(EntryStatus::Active), "dup", "Petrov", Utc::now()).unwrap();
        let result = cancel(&first, "", "Petrov", Utc::now());
        assert!(matches!(result, Err(ShiftlogError::InvalidState(_))));
    }

    #[test]
    fn test_activate_only_from_draft() {
        let activated = activate(&entry(EntryStatus::Draft)).unwrap();
        assert_eq!(activated.status, EntryStatus::Active);
        assert!(activate(&activated).unwrap_err().is_invalid_state());
    }
}
