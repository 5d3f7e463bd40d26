//! Shift reports.
//!
//! A [`Report`] is a filtered, chronological snapshot of the journal with
//! summary counts and reference names resolved. It renders as plain text,
//! Markdown or JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, ShiftlogError};
use crate::filter::{self, FilterOptions};
use crate::model::{
    Cancellation, EntryCategory, EntryStatus, JournalEntry, Priority, ReferenceSnapshot,
};
use crate::stats::{self, Summary};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Output format for [`Report::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl FromStr for ReportFormat {
    type Err = ShiftlogError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(ShiftlogError::InvalidInput(format!(
                "Unknown report format: {}",
                value
            ))),
        }
    }
}

/// One entry as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: EntryCategory,
    pub priority: Priority,
    pub status: EntryStatus,
    pub title: String,
    pub description: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<Cancellation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub filters: FilterOptions,
    pub summary: Summary,
    pub by_category: BTreeMap<EntryCategory, usize>,
    pub by_priority: BTreeMap<Priority, usize>,

    /// Oldest first
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Build a report over the entries selected by `filters`.
    pub fn build(
        entries: &[JournalEntry],
        filters: &FilterOptions,
        references: &ReferenceSnapshot,
        now: DateTime<Utc>,
    ) -> Self {
        let mut selected = filter::apply(entries, filters);
        selected.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let rows = selected
            .iter()
            .map(|entry| {
                let resolved = references.resolve(entry);
                ReportRow {
                    id: entry.id,
                    timestamp: entry.timestamp,
                    category: entry.category,
                    priority: entry.priority,
                    status: entry.status,
                    title: entry.title.clone(),
                    description: entry.description.clone(),
                    author: entry.author.clone(),
                    equipment: resolved.equipment_name().map(str::to_string),
                    location: resolved.location_name().map(str::to_string),
                    category_ref: resolved.category_name().map(str::to_string),
                    cancellation: entry.cancellation.clone(),
                }
            })
            .collect();

        Self {
            generated_at: now,
            filters: filters.clone(),
            summary: stats::summarize(&selected),
            by_category: stats::by_category(&selected),
            by_priority: stats::by_priority(&selected),
            rows,
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(TextReport(self).to_string()),
            ReportFormat::Markdown => Ok(MarkdownReport(self).to_string()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn filter_line(&self) -> String {
        let parts = self.filters.describe();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn references_line(row: &ReportRow) -> Option<String> {
    let parts: Vec<String> = [
        row.category_ref.as_deref().map(|name| format!("category: {}", name)),
        row.equipment.as_deref().map(|name| format!("equipment: {}", name)),
        row.location.as_deref().map(|name| format!("location: {}", name)),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

struct TextReport<'a>(&'a Report);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let s = &report.summary;
        writeln!(f, "SHIFT REPORT")?;
        writeln!(f, "Generated: {}", report.generated_at.format(TIME_FORMAT))?;
        writeln!(f, "Filters:   {}", report.filter_line())?;
        writeln!(f)?;
        writeln!(
            f,
            "Total {}  |  Active {}  |  Drafts {}  |  Cancelled {}  |  Critical {}",
            s.total, s.active, s.drafts, s.cancelled, s.critical
        )?;

        if !report.by_category.is_empty() {
            writeln!(f)?;
            writeln!(f, "By category:")?;
            for (category, count) in &report.by_category {
                writeln!(f, "  {:<20} {}", category.label(), count)?;
            }
        }

        writeln!(f)?;
        if report.rows.is_empty() {
            return writeln!(f, "No entries.");
        }
        for row in &report.rows {
            writeln!(
                f,
                "[{}] {} / {} / {}  {}",
                row.timestamp.format(TIME_FORMAT),
                row.category.label(),
                row.priority,
                row.status,
                row.title
            )?;
            writeln!(f, "    {}", row.description)?;
            writeln!(f, "    by {}", row.author)?;
            if let Some(line) = references_line(row) {
                writeln!(f, "    {}", line)?;
            }
            if let Some(c) = &row.cancellation {
                writeln!(
                    f,
                    "    cancelled {} by {}: {}",
                    c.cancelled_at.format(TIME_FORMAT),
                    c.cancelled_by,
                    c.reason
                )?;
            }
        }
        Ok(())
    }
}

struct MarkdownReport<'a>(&'a Report);

/// Escape table-breaking characters in a Markdown cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

impl fmt::Display for MarkdownReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let s = &report.summary;
        writeln!(f, "# Shift report")?;
        writeln!(f)?;
        writeln!(f, "- Generated: {}", report.generated_at.format(TIME_FORMAT))?;
        writeln!(f, "- Filters: {}", report.filter_line())?;
        writeln!(f)?;
        writeln!(f, "| Total | Active | Drafts | Cancelled | Critical |")?;
        writeln!(f, "|---|---|---|---|---|")?;
        writeln!(
            f,
            "| {} | {} | {} | {} | {} |",
            s.total, s.active, s.drafts, s.cancelled, s.critical
        )?;
        writeln!(f)?;

        if report.rows.is_empty() {
            return writeln!(f, "_No entries._");
        }

        writeln!(f, "| Time | Category | Priority | Status | Title | Author | References |")?;
        writeln!(f, "|---|---|---|---|---|---|---|")?;
        for row in &report.rows {
            writeln!(
                f,
                "| {} | {} | {} | {} | {} | {} | {} |",
                row.timestamp.format(TIME_FORMAT),
                row.category.label(),
                row.priority,
                row.status,
                cell(&row.title),
                cell(&row.author),
                cell(&references_line(row).unwrap_or_default())
            )?;
        }

        let cancelled: Vec<&ReportRow> = report
            .rows
            .iter()
            .filter(|row| row.cancellation.is_some())
            .collect();
        if !cancelled.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Cancellations")?;
            writeln!(f)?;
            for row in cancelled {
                if let Some(c) = &row.cancellation {
                    writeln!(
                        f,
                        "- **{}**: cancelled by {} at {}: {}",
                        cell(&row.title),
                        c.cancelled_by,
                        c.cancelled_at.format(TIME_FORMAT),
                        c.reason
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(title: &str, hour: u32, status: EntryStatus) -> JournalEntry {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap();
        JournalEntry {
            id: Uuid::now_v7(),
            category: EntryCategory::NetworkOutages,
            title: title.to_string(),
            description: "Feeder 12 tripped".to_string(),
            timestamp,
            author: "Ivanov".to_string(),
            status,
            priority: Priority::High,
            equipment_id: None,
            location_id: None,
            category_id: None,
            cancellation: (status == EntryStatus::Cancelled).then(|| Cancellation {
                cancelled_at: timestamp,
                cancelled_by: "Petrov".to_string(),
                reason: "Duplicate".to_string(),
            }),
            created_at: timestamp,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()
    }

    fn unfiltered(entries: &[JournalEntry]) -> Report {
        Report::build(entries, &FilterOptions::new(), &ReferenceSnapshot::default(), now())
    }

    #[test]
    fn test_rows_are_chronological() {
        // Store order is newest first.
        let entries = vec![
            entry("late", 20, EntryStatus::Active),
            entry("early", 6, EntryStatus::Active),
        ];
        let report = unfiltered(&entries);
        let titles: Vec<&str> = report.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
        assert_eq!(report.summary.total, 2);
    }

    #[test]
    fn test_build_applies_filters() {
        let entries = vec![
            entry("kept", 8, EntryStatus::Cancelled),
            entry("dropped", 9, EntryStatus::Active),
        ];
        let filters = FilterOptions::new().status(EntryStatus::Cancelled);
        let report = Report::build(&entries, &filters, &ReferenceSnapshot::default(), now());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.summary.cancelled, 1);
        assert_eq!(report.by_priority.get(&Priority::High), Some(&1));
    }

    #[test]
    fn test_text_render_mentions_cancellation() {
        let entries = vec![entry("Trip", 8, EntryStatus::Cancelled)];
        let report = unfiltered(&entries);
        let text = report.render(ReportFormat::Text).unwrap();
        assert!(text.contains("SHIFT REPORT"));
        assert!(text.contains("cancelled"));
        assert!(text.contains("Petrov"));
        assert!(text.contains("Filters:   none"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let entries = vec![entry("A|B", 8, EntryStatus::Active)];
        let report = unfiltered(&entries);
        let markdown = report.render(ReportFormat::Markdown).unwrap();
        assert!(markdown.contains("A\\|B"));
    }

    #[test]
    fn test_json_render_is_valid() {
        let entries = vec![entry("Trip", 8, EntryStatus::Active)];
        let report = unfiltered(&entries);
        let json: serde_json::Value =
            serde_json::from_str(&report.render(ReportFormat::Json).unwrap()).unwrap();
        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["by_category"]["network_outages"], 1);
    }

    #[test]
    fn test_empty_report() {
        let report = unfiltered(&[]);
        assert!(report
            .render(ReportFormat::Text)
            .unwrap()
            .contains("No entries."));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("MD".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!("pdf".parse::<ReportFormat>().is_err());
    }
}
