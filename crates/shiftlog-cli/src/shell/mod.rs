//! Interactive menu over an open journal.
//!
//! The shell keeps one [`Session`] open for its whole run, moves between
//! dialogs through [`ActiveDialog`] and saves the journal after every
//! change.

pub mod dialog;
pub mod prompts;

use std::path::Path;

use chrono::Utc;

use shiftlog_core::model::ReferenceRecord;
use shiftlog_core::{
    Category, EntryCategory, EntryStatus, Equipment, FilterOptions, JournalEntry, Location,
    NewCategory, NewEntry, NewNamedRecord, Priority, ReferenceSnapshot, ReferenceUpdate, Report,
    ReportFormat, ShiftlogError,
};

use crate::app::{AppContext, Session};
use crate::commands::references::RecordView;
use crate::errors::classify;
use crate::helpers::{parse_datetime, parse_end_bound};
use crate::output::{entry_rows, ENTRY_COLUMNS};
use crate::ui::{
    blank_line, header, print, print_error, receipt, short_id, simple_table, single_line, table,
    truncate, UiContext,
};

pub use dialog::ActiveDialog;
use dialog::{labels, ManagerAction, MenuAction};

const PICK_TITLE_MAX: usize = 40;

pub fn run(ctx: &AppContext) -> anyhow::Result<()> {
    if !ctx.interactive() {
        return Err(ShiftlogError::InvalidInput(
            "The shell needs an interactive terminal (and no --no-input)".to_string(),
        )
        .into());
    }
    let session = ctx.open_session()?;
    let operator = session.operator()?;
    let shell = Shell {
        ui: ctx.ui_context(false, None),
        session,
        operator,
    };
    tracing::info!(target: "shiftlog", event = "shell_started", operator = %shell.operator);

    let result = shell.run_loop();
    shell.session.close()?;
    result
}

struct Shell {
    ui: UiContext,
    session: Session,
    operator: String,
}

impl Shell {
    fn run_loop(&self) -> anyhow::Result<()> {
        let mut dialog = ActiveDialog::None;
        loop {
            dialog = match dialog {
                ActiveDialog::None => {
                    self.print_status()?;
                    let action = self.main_menu()?;
                    if action == MenuAction::Quit {
                        return Ok(());
                    }
                    let next = action.dialog();
                    if next == ActiveDialog::None {
                        let outcome = self.inline_action(action);
                        self.report_outcome(outcome);
                    }
                    next
                }
                ActiveDialog::AddEntry => {
                    self.open(dialog);
                    let outcome = self.add_entry();
                    self.report_outcome(outcome);
                    ActiveDialog::None
                }
                ActiveDialog::CategoryManager => {
                    self.open(dialog);
                    self.manage::<Category>(new_category)?;
                    ActiveDialog::None
                }
                ActiveDialog::EquipmentManager => {
                    self.open(dialog);
                    self.manage::<Equipment>(|shell| {
                        let new = new_named_record()?;
                        Ok(shell
                            .session
                            .store
                            .manage_references(|manager| manager.create_equipment(new))?)
                    })?;
                    ActiveDialog::None
                }
                ActiveDialog::LocationManager => {
                    self.open(dialog);
                    self.manage::<Location>(|shell| {
                        let new = new_named_record()?;
                        Ok(shell
                            .session
                            .store
                            .manage_references(|manager| manager.create_location(new))?)
                    })?;
                    ActiveDialog::None
                }
                ActiveDialog::Report => {
                    self.open(dialog);
                    let outcome = self.report();
                    self.report_outcome(outcome);
                    ActiveDialog::None
                }
            };
        }
    }

    fn open(&self, dialog: ActiveDialog) {
        blank_line(&self.ui);
        println!("{}", header(&self.ui, dialog.title(), None));
    }

    fn print_status(&self) -> anyhow::Result<()> {
        let summary = self.session.store.summary()?;
        let filters = self.session.store.filters()?.describe();
        blank_line(&self.ui);
        println!("{}", header(&self.ui, "shell", Some(&self.operator)));
        println!(
            "{} shown \u{00B7} {} active \u{00B7} {} drafts \u{00B7} {} cancelled \u{00B7} {} critical",
            summary.total, summary.active, summary.drafts, summary.cancelled, summary.critical
        );
        if !filters.is_empty() {
            println!("Filters: {}", filters.join(" "));
        }
        Ok(())
    }

    fn main_menu(&self) -> anyhow::Result<MenuAction> {
        let items = labels(&MenuAction::ALL, MenuAction::label);
        let selection = prompts::select_one("Action", &items)?.unwrap_or(0);
        MenuAction::ALL
            .get(selection)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid menu selection"))
    }

    /// Print a failed action and carry on.
    fn report_outcome(&self, outcome: anyhow::Result<()>) {
        if let Err(err) = outcome {
            let failure = classify(&err);
            print_error(&self.ui, &failure.message, failure.hint);
        }
    }

    fn inline_action(&self, action: MenuAction) -> anyhow::Result<()> {
        match action {
            MenuAction::ListEntries => self.list_entries(),
            MenuAction::Filter => self.set_filters(),
            MenuAction::ClearFilters => Ok(self.session.store.clear_filters()?),
            MenuAction::CancelEntry => self.cancel_entry(),
            MenuAction::ActivateEntry => self.activate_entry(),
            _ => Ok(()),
        }
    }

    fn list_entries(&self) -> anyhow::Result<()> {
        let entries = self.session.store.filtered()?;
        if entries.is_empty() {
            print(&self.ui, "No entries.");
            return Ok(());
        }
        println!(
            "{}",
            simple_table(&self.ui, &ENTRY_COLUMNS, &entry_rows(&self.ui, &entries))
        );
        Ok(())
    }

    fn set_filters(&self) -> anyhow::Result<()> {
        let mut filters = FilterOptions::new();

        let categories: Vec<String> = EntryCategory::ALL
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        if let Some(i) = prompts::select_optional("Category", &categories)? {
            filters = filters.category(EntryCategory::ALL[i]);
        }
        let statuses: Vec<String> = EntryStatus::ALL
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        if let Some(i) = prompts::select_optional("Status", &statuses)? {
            filters = filters.status(EntryStatus::ALL[i]);
        }
        let priorities: Vec<String> = Priority::ALL
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        if let Some(i) = prompts::select_optional("Priority", &priorities)? {
            filters = filters.priority(Priority::ALL[i]);
        }
        if let Some(value) = prompts::input_optional("From (YYYY-MM-DD, blank for any)")? {
            filters = filters.date_from(parse_datetime(&value)?);
        }
        if let Some(value) = prompts::input_optional("To (YYYY-MM-DD, blank for any)")? {
            filters = filters.date_to(parse_end_bound(&value)?);
        }
        if let Some(value) = prompts::input_optional("Search text (blank for none)")? {
            filters = filters.search(value);
        }

        let references = self.session.store.references()?;
        let choices = FilterChoices::new(&references);
        if let Some(i) = prompts::select_optional("Equipment", &record_names(&choices.equipment))? {
            filters = filters.equipment(choices.equipment[i].id);
        }
        if let Some(i) = prompts::select_optional("Location", &record_names(&choices.locations))? {
            filters = filters.location(choices.locations[i].id);
        }
        if let Some(i) =
            prompts::select_optional("Category record", &record_names(&choices.categories))?
        {
            filters = filters.category_ref(choices.categories[i].id);
        }

        self.session.store.set_filters(filters)?;
        Ok(())
    }

    fn add_entry(&self) -> anyhow::Result<()> {
        let category = prompts::select_category()?;
        let title = prompts::input_text("Title")?;
        let description = prompts::input_text("Description")?;
        let priority = prompts::select_priority(Priority::default())?;

        let mut entry = NewEntry::new(category, title, description, self.operator.clone(), priority);

        let references = self.session.store.references()?;
        let equipment = references.active_equipment();
        if let Some(i) = prompts::select_optional("Equipment", &record_names(&equipment))? {
            entry = entry.with_equipment(equipment[i].id);
        }
        let locations = references.active_locations();
        if let Some(i) = prompts::select_optional("Location", &record_names(&locations))? {
            entry = entry.with_location(locations[i].id);
        }
        let categories = references.active_categories();
        if let Some(i) = prompts::select_optional("Category record", &record_names(&categories))? {
            entry = entry.with_category_ref(categories[i].id);
        }
        if prompts::confirm("Save as draft?", false)? {
            entry = entry.as_draft();
        }

        let created = self.session.store.create(entry)?;
        self.session.save()?;
        let id = short_id(&created.id);
        print(
            &self.ui,
            &receipt(
                &self.ui,
                "Added entry",
                &[("ID", id.as_str()), ("Status", created.status.as_str())],
            ),
        );
        Ok(())
    }

    /// Let the operator pick one entry matching `eligible`.
    fn pick_entry(
        &self,
        prompt: &str,
        eligible: impl Fn(&JournalEntry) -> bool,
    ) -> anyhow::Result<Option<JournalEntry>> {
        let entries: Vec<JournalEntry> = self
            .session
            .store
            .filtered()?
            .into_iter()
            .filter(|entry| eligible(entry))
            .collect();
        if entries.is_empty() {
            print(&self.ui, "No matching entries.");
            return Ok(None);
        }
        let items: Vec<String> = entries
            .iter()
            .map(|entry| {
                format!(
                    "{}  {}  {}",
                    short_id(&entry.id),
                    entry.status,
                    truncate(&single_line(&entry.title), PICK_TITLE_MAX)
                )
            })
            .collect();
        Ok(prompts::select_optional(prompt, &items)?.and_then(|i| entries.into_iter().nth(i)))
    }

    fn cancel_entry(&self) -> anyhow::Result<()> {
        let Some(entry) = self.pick_entry("Entry to cancel", |e| !e.status.is_terminal())? else {
            return Ok(());
        };
        let reason = prompts::input_text("Reason for cancellation")?;
        let cancelled = self
            .session
            .store
            .cancel(&entry.id, &reason, &self.operator)?;
        self.session.save()?;
        let id = short_id(&cancelled.id);
        print(
            &self.ui,
            &receipt(
                &self.ui,
                "Cancelled entry",
                &[("ID", id.as_str()), ("Cancelled by", self.operator.as_str())],
            ),
        );
        Ok(())
    }

    fn activate_entry(&self) -> anyhow::Result<()> {
        let Some(entry) = self.pick_entry("Draft to activate", |e| e.status == EntryStatus::Draft)?
        else {
            return Ok(());
        };
        let activated = self.session.store.activate(&entry.id)?;
        self.session.save()?;
        let id = short_id(&activated.id);
        print(
            &self.ui,
            &receipt(&self.ui, "Activated entry", &[("ID", id.as_str())]),
        );
        Ok(())
    }

    /// Reference manager loop; returns to the main menu on "Back".
    fn manage<R: RecordView>(
        &self,
        create: impl Fn(&Self) -> anyhow::Result<R>,
    ) -> anyhow::Result<()> {
        let items = labels(&ManagerAction::ALL, ManagerAction::label);
        loop {
            let selection = prompts::select_one(R::KIND.as_str(), &items)?.unwrap_or(0);
            let action = ManagerAction::ALL
                .get(selection)
                .copied()
                .unwrap_or(ManagerAction::Back);
            let outcome = match action {
                ManagerAction::Back => return Ok(()),
                ManagerAction::List => self.list_records::<R>(),
                ManagerAction::Add => create(self).map(|record| {
                    self.record_receipt(&format!("Added {}", R::KIND), &record)
                }),
                ManagerAction::Rename => self.rename_record::<R>(),
                ManagerAction::Deactivate => self.toggle_record::<R>(false),
                ManagerAction::Reactivate => self.toggle_record::<R>(true),
            };
            let outcome = match outcome {
                Ok(()) if action.mutates() => self.session.save(),
                other => other,
            };
            self.report_outcome(outcome);
        }
    }

    fn list_records<R: RecordView>(&self) -> anyhow::Result<()> {
        let records = self
            .session
            .store
            .manage_references(|manager| manager.list::<R>(false))?;
        if records.is_empty() {
            print(&self.ui, &format!("No {} records.", R::KIND));
            return Ok(());
        }
        let rows: Vec<Vec<String>> = records.iter().map(|r| r.row(&self.ui)).collect();
        println!("{}", table(&self.ui, &R::columns(), &rows));
        Ok(())
    }

    fn pick_record<R: RecordView>(
        &self,
        prompt: &str,
        eligible: impl Fn(&R) -> bool,
    ) -> anyhow::Result<Option<R>> {
        let records: Vec<R> = self
            .session
            .store
            .manage_references(|manager| manager.list::<R>(false))?
            .into_iter()
            .filter(|record| eligible(record))
            .collect();
        if records.is_empty() {
            print(&self.ui, &format!("No matching {} records.", R::KIND));
            return Ok(None);
        }
        let names: Vec<&R> = records.iter().collect();
        let selection = prompts::select_optional(prompt, &record_names(&names))?;
        Ok(selection.and_then(|i| records.into_iter().nth(i)))
    }

    fn rename_record<R: RecordView>(&self) -> anyhow::Result<()> {
        let Some(record) = self.pick_record::<R>("Record to rename", |_| true)? else {
            return Ok(());
        };
        let name = prompts::input_text("New name")?;
        let update = ReferenceUpdate::new().name(name);
        let id = record.id();
        let updated = self
            .session
            .store
            .manage_references(|manager| manager.update::<R>(&id, &update))?;
        self.record_receipt(&format!("Renamed {}", R::KIND), &updated);
        Ok(())
    }

    fn toggle_record<R: RecordView>(&self, active: bool) -> anyhow::Result<()> {
        let prompt = if active {
            "Record to reactivate"
        } else {
            "Record to deactivate"
        };
        let Some(record) = self.pick_record::<R>(prompt, |r| r.is_active() != active)? else {
            return Ok(());
        };
        let id = record.id();
        let updated = self.session.store.manage_references(|manager| {
            if active {
                manager.reactivate::<R>(&id)
            } else {
                manager.deactivate::<R>(&id)
            }
        })?;
        let title = if active { "Reactivated" } else { "Deactivated" };
        self.record_receipt(&format!("{} {}", title, R::KIND), &updated);
        Ok(())
    }

    fn record_receipt<R: ReferenceRecord>(&self, title: &str, record: &R) {
        print(
            &self.ui,
            &receipt(&self.ui, title, &[("Name", record.name())]),
        );
    }

    fn report(&self) -> anyhow::Result<()> {
        let formats = [ReportFormat::Text, ReportFormat::Markdown, ReportFormat::Json];
        let names = vec![
            "Text".to_string(),
            "Markdown".to_string(),
            "JSON".to_string(),
        ];
        let format = prompts::select_one("Format", &names)?
            .and_then(|i| formats.get(i).copied())
            .unwrap_or_default();

        let entries = self.session.store.list()?;
        let filters = self.session.store.filters()?;
        let references = self.session.store.references()?;
        let rendered = Report::build(&entries, &filters, &references, Utc::now()).render(format)?;

        match prompts::input_optional("Save to file (blank to print)")? {
            Some(path) => {
                shiftlog_core::fs::write_atomic(Path::new(&path), rendered.as_bytes())
                    .map_err(|e| anyhow::anyhow!("Failed to write report {}: {}", path, e))?;
                print(
                    &self.ui,
                    &receipt(&self.ui, "Wrote report", &[("Path", path.as_str())]),
                );
            }
            None => println!("{}", rendered.trim_end()),
        }
        Ok(())
    }
}

/// Reference records offered by the filter dialog. Inactive records stay
/// listed so entries that point at them can still be found.
struct FilterChoices<'a> {
    equipment: Vec<&'a Equipment>,
    locations: Vec<&'a Location>,
    categories: Vec<&'a Category>,
}

impl<'a> FilterChoices<'a> {
    fn new(references: &'a ReferenceSnapshot) -> Self {
        Self {
            equipment: references.all_equipment(),
            locations: references.all_locations(),
            categories: references.all_categories(),
        }
    }
}

fn record_names<R: ReferenceRecord>(records: &[&R]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            if record.is_active() {
                record.name().to_string()
            } else {
                format!("{} (inactive)", record.name())
            }
        })
        .collect()
}

fn new_category(shell: &Shell) -> anyhow::Result<Category> {
    let code = prompts::input_text("Code")?;
    let name = prompts::input_text("Name")?;
    let mut new = NewCategory::new(code, name);
    if let Some(description) = prompts::input_optional("Description (optional)")? {
        new = new.with_description(description);
    }
    if let Some(order) = prompts::input_optional("Sort order (blank for 0)")? {
        let order: i32 = order
            .parse()
            .map_err(|_| ShiftlogError::InvalidInput(format!("Not a number: {}", order)))?;
        new = new.with_sort_order(order);
    }
    Ok(shell
        .session
        .store
        .manage_references(|manager| manager.create_category(new))?)
}

fn new_named_record() -> anyhow::Result<NewNamedRecord> {
    let name = prompts::input_text("Name")?;
    let mut new = NewNamedRecord::new(name);
    if let Some(description) = prompts::input_optional("Description (optional)")? {
        new = new.with_description(description);
    }
    Ok(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn equipment(name: &str, is_active: bool) -> Equipment {
        Equipment {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_choices_keep_inactive_records() {
        let references = ReferenceSnapshot {
            equipment: vec![equipment("Breaker Q2", false), equipment("Breaker Q1", true)],
            categories: vec![Category {
                id: Uuid::now_v7(),
                code: "RZA".to_string(),
                name: "Relay protection".to_string(),
                description: None,
                is_active: false,
                sort_order: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }],
            ..Default::default()
        };
        let choices = FilterChoices::new(&references);
        assert_eq!(
            record_names(&choices.equipment),
            vec!["Breaker Q1", "Breaker Q2 (inactive)"]
        );
        assert_eq!(
            record_names(&choices.categories),
            vec!["Relay protection (inactive)"]
        );
        assert!(choices.locations.is_empty());
    }

    #[test]
    fn test_record_names_mark_inactive() {
        let active = equipment("Breaker Q1", true);
        let retired = equipment("Breaker Q2", false);
        let names = record_names(&[&active, &retired]);
        assert_eq!(names, vec!["Breaker Q1", "Breaker Q2 (inactive)"]);
    }
}
