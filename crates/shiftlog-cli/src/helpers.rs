//! Parsing and prompting helpers shared by the command handlers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use dialoguer::Password;
use uuid::Uuid;
use zeroize::Zeroizing;

use shiftlog_core::model::{same_name, ReferenceRecord};
use shiftlog_core::{
    Category, FilterOptions, JournalEntry, ReferenceSnapshot, ShiftlogError,
};

use crate::cli::FilterArgs;

/// Shortest accepted entry ID prefix.
const MIN_ID_PREFIX: usize = 4;

/// Read the passphrase from SHIFTLOG_PASSPHRASE, or prompt for it.
pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_passphrase() {
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set SHIFTLOG_PASSPHRASE."
        ));
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for a new passphrase with confirmation (for init).
pub fn prompt_init_passphrase(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = env_passphrase() {
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "--no-input requires SHIFTLOG_PASSPHRASE for initialization"
        ));
    }
    Password::new()
        .with_prompt("Enter passphrase")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

pub fn env_passphrase() -> Option<Zeroizing<String>> {
    std::env::var("SHIFTLOG_PASSPHRASE")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}

/// Parse a datetime string (RFC 3339 or YYYY-MM-DD at midnight UTC).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    let midnight =
        NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(|| anyhow::anyhow!("Invalid midnight time"))?;
    parse_bound(value, midnight)
}

/// Like [`parse_datetime`], but a bare date covers the whole day.
pub fn parse_end_bound(value: &str) -> anyhow::Result<DateTime<Utc>> {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| anyhow::anyhow!("Invalid end-of-day time"))?;
    parse_bound(value, end_of_day)
}

fn parse_bound(value: &str, time_of_day: NaiveTime) -> anyhow::Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(time_of_day).and_utc());
    }

    Err(ShiftlogError::InvalidInput(format!(
        "Invalid date/time (expected RFC 3339 or YYYY-MM-DD): {}",
        value
    ))
    .into())
}

/// Resolve a full UUID or a unique prefix against the loaded entries.
pub fn resolve_entry_id(entries: &[JournalEntry], value: &str) -> Result<Uuid, ShiftlogError> {
    let value = value.trim().to_ascii_lowercase();
    if let Ok(id) = Uuid::parse_str(&value) {
        return Ok(id);
    }
    if value.len() < MIN_ID_PREFIX {
        return Err(ShiftlogError::InvalidInput(format!(
            "Entry ID prefix must be at least {} characters: {}",
            MIN_ID_PREFIX, value
        )));
    }

    let mut matches = entries
        .iter()
        .filter(|entry| entry.id.to_string().starts_with(&value));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry.id),
        (None, _) => Err(ShiftlogError::NotFound(format!("entry {}", value))),
        (Some(_), Some(_)) => Err(ShiftlogError::InvalidInput(format!(
            "Entry ID prefix is ambiguous: {}",
            value
        ))),
    }
}

/// Find a reference record by ID or name, ignoring case.
pub fn resolve_record<'a, R: ReferenceRecord>(
    records: &'a [R],
    value: &str,
) -> Result<&'a R, ShiftlogError> {
    let value = value.trim();
    let by_id = Uuid::parse_str(value).ok();
    records
        .iter()
        .find(|record| Some(record.id()) == by_id || same_name(record.name(), value))
        .ok_or_else(|| ShiftlogError::NotFound(format!("{} {}", R::KIND, value)))
}

/// Categories are also addressable by code.
pub fn resolve_category<'a>(
    categories: &'a [Category],
    value: &str,
) -> Result<&'a Category, ShiftlogError> {
    categories
        .iter()
        .find(|category| same_name(&category.code, value))
        .map_or_else(|| resolve_record(categories, value), Ok)
}

/// Build filter criteria from command-line flags.
pub fn build_filters(
    args: &FilterArgs,
    references: &ReferenceSnapshot,
) -> anyhow::Result<FilterOptions> {
    let mut filters = FilterOptions::new();
    if let Some(ref value) = args.category {
        filters = filters.category(value.parse()?);
    }
    if let Some(ref value) = args.status {
        filters = filters.status(value.parse()?);
    }
    if let Some(ref value) = args.priority {
        filters = filters.priority(value.parse()?);
    }
    if let Some(ref value) = args.from {
        filters = filters.date_from(parse_datetime(value)?);
    }
    if let Some(ref value) = args.to {
        filters = filters.date_to(parse_end_bound(value)?);
    }
    if let Some(ref value) = args.search {
        filters = filters.search(value.clone());
    }
    if let Some(ref value) = args.equipment {
        filters = filters.equipment(resolve_record(&references.equipment, value)?.id);
    }
    if let Some(ref value) = args.location {
        filters = filters.location(resolve_record(&references.locations, value)?.id);
    }
    if let Some(ref value) = args.category_ref {
        filters = filters.category_ref(resolve_category(&references.categories, value)?.id);
    }
    Ok(filters)
}
