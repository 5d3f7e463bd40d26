use shiftlog_core::{EntryCategory, EntryStatus, NewEntry, Priority, ShiftlogError};

use crate::app::{AppContext, Session};
use crate::cli::{AddArgs, CancelArgs, EntryIdArgs, ListArgs};
use crate::helpers::{
    build_filters, parse_datetime, resolve_category, resolve_entry_id, resolve_record,
};
use crate::output::{entries_json, entry_detail, entry_json, entry_rows, ENTRY_COLUMNS};
use crate::shell::prompts;
use crate::ui::{blank_line, divider, header, hint, print, receipt, short_id, simple_table};

fn parse_list_format(value: Option<&str>) -> anyhow::Result<()> {
    match value {
        None | Some("table") | Some("plain") | Some("json") => Ok(()),
        Some(other) => Err(anyhow::anyhow!(
            "Unsupported format: {} (use table, plain or json)",
            other
        )),
    }
}

/// Build a new entry from flags, prompting for whatever is missing.
fn entry_from_args(
    ctx: &AppContext,
    session: &Session,
    args: &AddArgs,
) -> anyhow::Result<NewEntry> {
    let interactive = ctx.interactive();
    let author = session.operator()?;
    let references = session.store.references()?;

    let category: EntryCategory = match (args.category.as_deref(), interactive) {
        (Some(value), _) => value.parse()?,
        (None, true) => prompts::select_category()?,
        (None, false) => {
            return Err(ShiftlogError::Validation("Category is required".to_string()).into())
        }
    };
    let title = match (args.title.clone(), interactive) {
        (Some(value), _) => value,
        (None, true) => prompts::input_text("Title")?,
        (None, false) => String::new(),
    };
    let description = match (args.description.clone(), interactive) {
        (Some(value), _) => value,
        (None, true) => prompts::input_text("Description")?,
        (None, false) => String::new(),
    };
    let priority: Priority = match (args.priority.as_deref(), interactive) {
        (Some(value), _) => value.parse()?,
        (None, true) => prompts::select_priority(Priority::default())?,
        (None, false) => Priority::default(),
    };

    let mut entry = NewEntry::new(category, title, description, author, priority);
    if let Some(ref value) = args.at {
        entry = entry.at(parse_datetime(value)?);
    }
    if args.draft {
        entry = entry.as_draft();
    }
    if let Some(ref value) = args.equipment {
        entry = entry.with_equipment(resolve_record(&references.equipment, value)?.id);
    }
    if let Some(ref value) = args.location {
        entry = entry.with_location(resolve_record(&references.locations, value)?.id);
    }
    if let Some(ref value) = args.category_ref {
        entry = entry.with_category_ref(resolve_category(&references.categories, value)?.id);
    }
    Ok(entry)
}

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let new_entry = entry_from_args(ctx, &session, args)?;
    let entry = session.store.create(new_entry)?;
    let references = session.store.references()?;
    session.close()?;

    let ui = ctx.ui_context(args.json, None);
    if ui.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&entry_json(&entry, &references))?
        );
    } else if !ctx.quiet() {
        let id = entry.id.to_string();
        print(
            &ui,
            &receipt(
                &ui,
                "Added entry",
                &[
                    ("ID", id.as_str()),
                    ("Status", entry.status.as_str()),
                    ("Priority", entry.priority.as_str()),
                ],
            ),
        );
        if entry.status == EntryStatus::Draft {
            print(
                &ui,
                &hint(
                    &ui,
                    &format!("Activate with `shiftlog activate {}`", short_id(&entry.id)),
                ),
            );
        }
    }
    Ok(())
}

pub fn handle_cancel(ctx: &AppContext, args: &CancelArgs) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let operator = session.operator()?;
    let id = resolve_entry_id(&session.store.list()?, &args.id)?;

    let reason = match (args.reason.clone(), ctx.interactive()) {
        (Some(value), _) => value,
        (None, true) => prompts::input_text("Reason for cancellation")?,
        (None, false) => String::new(),
    };

    let entry = session.store.cancel(&id, &reason, &operator)?;
    let references = session.store.references()?;
    session.close()?;

    let ui = ctx.ui_context(args.json, None);
    if ui.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&entry_json(&entry, &references))?
        );
    } else if !ctx.quiet() {
        let id = entry.id.to_string();
        print(
            &ui,
            &receipt(
                &ui,
                "Cancelled entry",
                &[
                    ("ID", id.as_str()),
                    ("Cancelled by", operator.as_str()),
                    ("Reason", reason.trim()),
                ],
            ),
        );
    }
    Ok(())
}

pub fn handle_activate(ctx: &AppContext, args: &EntryIdArgs) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let id = resolve_entry_id(&session.store.list()?, &args.id)?;
    let entry = session.store.activate(&id)?;
    let references = session.store.references()?;
    session.close()?;

    let ui = ctx.ui_context(args.json, None);
    if ui.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&entry_json(&entry, &references))?
        );
    } else if !ctx.quiet() {
        let id = entry.id.to_string();
        print(
            &ui,
            &receipt(
                &ui,
                "Activated entry",
                &[("ID", id.as_str()), ("Status", entry.status.as_str())],
            ),
        );
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    parse_list_format(args.format.as_deref())?;
    let session = ctx.open_session()?;
    let references = session.store.references()?;
    let filters = build_filters(&args.filters, &references)?;
    let context = filters.describe().join(" ");
    session.store.set_filters(filters)?;

    let mut entries = session.store.filtered()?;
    let summary = session.store.summary()?;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    let ui = ctx.ui_context(args.json, args.format.as_deref());
    if ui.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries_json(&entries, &references))?
        );
        return Ok(());
    }

    if ui.mode.is_pretty() && !ctx.quiet() {
        let context = (!context.is_empty()).then_some(context.as_str());
        println!("{}", header(&ui, "list", context));
        blank_line(&ui);
    }

    if entries.is_empty() {
        if !ctx.quiet() {
            print(&ui, "No entries.");
        }
        return Ok(());
    }

    println!("{}", simple_table(&ui, &ENTRY_COLUMNS, &entry_rows(&ui, &entries)));
    if ui.mode.is_pretty() && !ctx.quiet() {
        blank_line(&ui);
        println!(
            "{} shown \u{00B7} {} active \u{00B7} {} drafts \u{00B7} {} cancelled \u{00B7} {} critical",
            entries.len(),
            summary.active,
            summary.drafts,
            summary.cancelled,
            summary.critical
        );
    }
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &EntryIdArgs) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let id = resolve_entry_id(&session.store.list()?, &args.id)?;
    let entry = session.store.get(&id)?;
    let references = session.store.references()?;

    let ui = ctx.ui_context(args.json, None);
    if ui.mode.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&entry_json(&entry, &references))?
        );
        return Ok(());
    }

    if ui.mode.is_pretty() {
        println!("{}", header(&ui, "show", Some(&short_id(&entry.id))));
        println!("{}", divider(&ui));
    }
    for line in entry_detail(&ui, &entry, &references) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_formats() {
        assert!(parse_list_format(None).is_ok());
        assert!(parse_list_format(Some("plain")).is_ok());
        assert!(parse_list_format(Some("json")).is_ok());
        assert!(parse_list_format(Some("csv")).is_err());
    }
}
