//! Output formatting helpers for the CLI.

use shiftlog_core::model::ReferenceRecord;
use shiftlog_core::{JournalEntry, ReferenceSnapshot, Summary};

use crate::ui::theme::{priority_style, status_style, styled, CRITICAL_MARK};
use crate::ui::{format_datetime, kv, short_id, single_line, truncate, wrap, Column, UiContext};

const TITLE_MAX: usize = 48;

pub const ENTRY_COLUMNS: [Column; 7] = [
    Column::new("ID"),
    Column::new("Time"),
    Column::new("Category"),
    Column::new("Priority"),
    Column::new("Status"),
    Column::new("Title"),
    Column::new("Author"),
];

/// Convert an entry to JSON, with reference names resolved.
pub fn entry_json(entry: &JournalEntry, references: &ReferenceSnapshot) -> serde_json::Value {
    let resolved = references.resolve(entry);
    serde_json::json!({
        "id": entry.id,
        "category": entry.category,
        "title": entry.title,
        "description": entry.description,
        "timestamp": entry.timestamp,
        "author": entry.author,
        "status": entry.status,
        "priority": entry.priority,
        "equipment_id": entry.equipment_id,
        "equipment": resolved.equipment_name(),
        "location_id": entry.location_id,
        "location": resolved.location_name(),
        "category_id": entry.category_id,
        "category_ref": resolved.category_name(),
        "cancellation": entry.cancellation,
        "created_at": entry.created_at,
    })
}

pub fn entries_json(
    entries: &[JournalEntry],
    references: &ReferenceSnapshot,
) -> Vec<serde_json::Value> {
    entries
        .iter()
        .map(|entry| entry_json(entry, references))
        .collect()
}

/// Table rows for an entry list.
///
/// Pretty rows use short IDs and styling; plain rows keep full values.
pub fn entry_rows(ctx: &UiContext, entries: &[JournalEntry]) -> Vec<Vec<String>> {
    let pretty = ctx.mode.is_pretty();
    entries
        .iter()
        .map(|entry| {
            let id = if pretty {
                short_id(&entry.id)
            } else {
                entry.id.to_string()
            };
            let mut priority = styled(
                entry.priority.as_str(),
                priority_style(entry.priority),
                ctx.color,
            );
            if pretty && entry.is_critical_active() {
                priority = format!("{} {}", CRITICAL_MARK.get(ctx.unicode), priority);
            }
            let title = if pretty {
                truncate(&single_line(&entry.title), TITLE_MAX)
            } else {
                single_line(&entry.title)
            };
            vec![
                id,
                format_datetime(&entry.timestamp, ctx.timezone, pretty),
                entry.category.to_string(),
                priority,
                styled(entry.status.as_str(), status_style(entry.status), ctx.color),
                title,
                entry.author.clone(),
            ]
        })
        .collect()
}

/// Detail lines for a single entry.
pub fn entry_detail(
    ctx: &UiContext,
    entry: &JournalEntry,
    references: &ReferenceSnapshot,
) -> Vec<String> {
    let pretty = ctx.mode.is_pretty();
    let resolved = references.resolve(entry);
    let mut lines = vec![
        kv(ctx, "ID", &entry.id.to_string()),
        kv(ctx, "Title", &entry.title),
        kv(
            ctx,
            "Time",
            &format_datetime(&entry.timestamp, ctx.timezone, pretty),
        ),
        kv(ctx, "Category", entry.category.label()),
        kv(
            ctx,
            "Priority",
            &styled(
                entry.priority.as_str(),
                priority_style(entry.priority),
                ctx.color,
            ),
        ),
        kv(
            ctx,
            "Status",
            &styled(entry.status.as_str(), status_style(entry.status), ctx.color),
        ),
        kv(ctx, "Author", &entry.author),
    ];
    if let Some(name) = resolved.equipment_name() {
        lines.push(kv(ctx, "Equipment", &reference_label(name, resolved.equipment)));
    }
    if let Some(name) = resolved.location_name() {
        lines.push(kv(ctx, "Location", &reference_label(name, resolved.location)));
    }
    if let Some(category) = resolved.category {
        let label = format!("{} ({})", category.name, category.code);
        lines.push(kv(ctx, "Category ref", &reference_label(&label, Some(category))));
    }
    if let Some(ref cancellation) = entry.cancellation {
        lines.push(kv(
            ctx,
            "Cancelled",
            &format_datetime(&cancellation.cancelled_at, ctx.timezone, pretty),
        ));
        lines.push(kv(ctx, "Cancelled by", &cancellation.cancelled_by));
        lines.push(kv(ctx, "Reason", &single_line(&cancellation.reason)));
    }

    if pretty {
        lines.push(String::new());
        lines.extend(wrap(&entry.description, ctx.width.clamp(20, 100)));
    } else {
        lines.push(kv(ctx, "Description", &single_line(&entry.description)));
    }
    lines
}

fn reference_label<R: ReferenceRecord>(name: &str, record: Option<&R>) -> String {
    match record {
        Some(record) if !record.is_active() => format!("{} (inactive)", name),
        _ => name.to_string(),
    }
}

pub fn summary_lines(ctx: &UiContext, summary: &Summary) -> Vec<String> {
    vec![
        kv(ctx, "Total", &summary.total.to_string()),
        kv(ctx, "Active", &summary.active.to_string()),
        kv(ctx, "Drafts", &summary.drafts.to_string()),
        kv(ctx, "Cancelled", &summary.cancelled.to_string()),
        kv(ctx, "Critical", &summary.critical.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;
    use shiftlog_core::{
        Cancellation, EntryCategory, EntryStatus, Equipment, Priority,
    };
    use uuid::Uuid;

    use crate::ui::OutputMode;

    fn plain_ctx() -> UiContext {
        UiContext {
            is_tty: false,
            color: false,
            unicode: false,
            width: 80,
            mode: OutputMode::Plain,
            timezone: Tz::UTC,
        }
    }

    fn cancelled_fault(equipment_id: Uuid) -> JournalEntry {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        JournalEntry {
            id: Uuid::now_v7(),
            category: EntryCategory::Emergency,
            title: "Fault".to_string(),
            description: "Line trip\non feeder 12".to_string(),
            timestamp: at,
            author: "Ivanov".to_string(),
            status: EntryStatus::Cancelled,
            priority: Priority::Critical,
            equipment_id: Some(equipment_id),
            location_id: None,
            category_id: None,
            cancellation: Some(Cancellation {
                cancelled_at: at,
                cancelled_by: "Petrov".to_string(),
                reason: "False alarm".to_string(),
            }),
            created_at: at,
        }
    }

    fn snapshot_with(equipment_id: Uuid) -> ReferenceSnapshot {
        ReferenceSnapshot {
            equipment: vec![Equipment {
                id: equipment_id,
                name: "Breaker Q1".to_string(),
                description: None,
                is_active: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }],
            ..ReferenceSnapshot::default()
        }
    }

    #[test]
    fn test_entry_json_resolves_names() {
        let equipment_id = Uuid::now_v7();
        let entry = cancelled_fault(equipment_id);
        let value = entry_json(&entry, &snapshot_with(equipment_id));

        assert_eq!(value["status"], "cancelled");
        assert_eq!(value["priority"], "critical");
        assert_eq!(value["equipment"], "Breaker Q1");
        assert!(value["location"].is_null());
        assert_eq!(value["cancellation"]["reason"], "False alarm");
    }

    #[test]
    fn test_plain_rows_keep_full_id() {
        let entry = cancelled_fault(Uuid::now_v7());
        let rows = entry_rows(&plain_ctx(), std::slice::from_ref(&entry));
        assert_eq!(rows[0][0], entry.id.to_string());
        assert_eq!(rows[0][1], "2024-03-01T08:00:00+00:00");
        assert_eq!(rows[0][4], "cancelled");
    }

    #[test]
    fn test_detail_includes_cancellation_and_inactive_reference() {
        let equipment_id = Uuid::now_v7();
        let entry = cancelled_fault(equipment_id);
        let lines = entry_detail(&plain_ctx(), &entry, &snapshot_with(equipment_id));

        assert!(lines.contains(&"equipment=Breaker Q1 (inactive)".to_string()));
        assert!(lines.contains(&"cancelled_by=Petrov".to_string()));
        assert!(lines.contains(&"reason=False alarm".to_string()));
        assert!(lines.contains(&"description=Line trip on feeder 12".to_string()));
    }

    #[test]
    fn test_summary_lines() {
        let summary = Summary {
            total: 3,
            active: 1,
            drafts: 1,
            cancelled: 1,
            critical: 1,
        };
        let lines = summary_lines(&plain_ctx(), &summary);
        assert_eq!(lines[0], "total=3");
        assert_eq!(lines[4], "critical=1");
    }
}
