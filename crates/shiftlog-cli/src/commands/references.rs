use serde::Serialize;

use shiftlog_core::model::ReferenceRecord;
use shiftlog_core::{
    AgeSqliteBackend, Category, Equipment, Location, ManagedRecord, NewCategory, NewNamedRecord,
    ReferenceKind, ReferenceManager, ReferenceUpdate, ShiftlogError,
};

use crate::app::AppContext;
use crate::cli::{CategoryCommand, NamedCommand, RefEditArgs, RefListArgs, RefTargetArgs};
use crate::helpers::{resolve_category, resolve_record};
use crate::ui::theme::{styled, styles};
use crate::ui::{print, receipt, table, truncate, Column, UiContext};

const DESCRIPTION_MAX: usize = 40;

/// Listing and lookup behavior for one reference record type.
pub trait RecordView: ManagedRecord + Serialize {
    fn columns() -> Vec<Column>;

    fn row(&self, ctx: &UiContext) -> Vec<String>;

    fn lookup<'a>(records: &'a [Self], value: &str) -> Result<&'a Self, ShiftlogError> {
        resolve_record(records, value)
    }
}

fn status_cell(ctx: &UiContext, active: bool) -> String {
    if active {
        styled("active", styles::success(), ctx.color)
    } else {
        styled("inactive", styles::dim(), ctx.color)
    }
}

fn description_cell(ctx: &UiContext, description: Option<&str>) -> String {
    let description = description.unwrap_or("");
    if ctx.mode.is_pretty() {
        truncate(description, DESCRIPTION_MAX)
    } else {
        description.to_string()
    }
}

impl RecordView for Category {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Code"),
            Column::new("Name"),
            Column::new("Order"),
            Column::new("Status"),
            Column::new("Description"),
            Column::new("ID"),
        ]
    }

    fn row(&self, ctx: &UiContext) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.sort_order.to_string(),
            status_cell(ctx, self.is_active),
            description_cell(ctx, self.description.as_deref()),
            self.id.to_string(),
        ]
    }

    fn lookup<'a>(records: &'a [Self], value: &str) -> Result<&'a Self, ShiftlogError> {
        resolve_category(records, value)
    }
}

fn named_columns() -> Vec<Column> {
    vec![
        Column::new("Name"),
        Column::new("Status"),
        Column::new("Description"),
        Column::new("ID"),
    ]
}

impl RecordView for Equipment {
    fn columns() -> Vec<Column> {
        named_columns()
    }

    fn row(&self, ctx: &UiContext) -> Vec<String> {
        vec![
            self.name.clone(),
            status_cell(ctx, self.is_active),
            description_cell(ctx, self.description.as_deref()),
            self.id.to_string(),
        ]
    }
}

impl RecordView for Location {
    fn columns() -> Vec<Column> {
        named_columns()
    }

    fn row(&self, ctx: &UiContext) -> Vec<String> {
        vec![
            self.name.clone(),
            status_cell(ctx, self.is_active),
            description_cell(ctx, self.description.as_deref()),
            self.id.to_string(),
        ]
    }
}

pub fn handle_category(ctx: &AppContext, action: &CategoryCommand) -> anyhow::Result<()> {
    match action {
        CategoryCommand::Add {
            code,
            name,
            description,
            sort_order,
        } => {
            let mut new = NewCategory::new(code.as_str(), name.as_str()).with_sort_order(*sort_order);
            if let Some(description) = description {
                new = new.with_description(description.as_str());
            }
            let session = ctx.open_session()?;
            let category = session
                .store
                .manage_references(|manager| manager.create_category(new))?;
            session.close()?;
            print_added(ctx, &category);
            Ok(())
        }
        CategoryCommand::List(args) => list_records::<Category>(ctx, args),
        CategoryCommand::Edit(args) => edit_record::<Category>(ctx, args),
        CategoryCommand::Deactivate(args) => set_active::<Category>(ctx, args, false),
        CategoryCommand::Activate(args) => set_active::<Category>(ctx, args, true),
    }
}

pub fn handle_equipment(ctx: &AppContext, action: &NamedCommand) -> anyhow::Result<()> {
    handle_named::<Equipment>(ctx, action, |manager, new| manager.create_equipment(new))
}

pub fn handle_location(ctx: &AppContext, action: &NamedCommand) -> anyhow::Result<()> {
    handle_named::<Location>(ctx, action, |manager, new| manager.create_location(new))
}

fn handle_named<R: RecordView>(
    ctx: &AppContext,
    action: &NamedCommand,
    create: impl FnOnce(
        &mut ReferenceManager<'_, AgeSqliteBackend>,
        NewNamedRecord,
    ) -> shiftlog_core::Result<R>,
) -> anyhow::Result<()> {
    match action {
        NamedCommand::Add { name, description } => {
            let mut new = NewNamedRecord::new(name.as_str());
            if let Some(description) = description {
                new = new.with_description(description.as_str());
            }
            let session = ctx.open_session()?;
            let record = session
                .store
                .manage_references(|manager| create(manager, new))?;
            session.close()?;
            print_added(ctx, &record);
            Ok(())
        }
        NamedCommand::List(args) => list_records::<R>(ctx, args),
        NamedCommand::Edit(args) => edit_record::<R>(ctx, args),
        NamedCommand::Deactivate(args) => set_active::<R>(ctx, args, false),
        NamedCommand::Activate(args) => set_active::<R>(ctx, args, true),
    }
}

fn print_added<R: ReferenceRecord>(ctx: &AppContext, record: &R) {
    if ctx.quiet() {
        return;
    }
    let ui = ctx.ui_context(false, None);
    let id = record.id().to_string();
    print(
        &ui,
        &receipt(
            &ui,
            &format!("Added {}", R::KIND),
            &[("Name", record.name()), ("ID", id.as_str())],
        ),
    );
}

fn list_records<R: RecordView>(ctx: &AppContext, args: &RefListArgs) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let records = session
        .store
        .manage_references(|manager| manager.list::<R>(!args.all))?;

    let ui = ctx.ui_context(args.json, None);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        if !ctx.quiet() {
            print(&ui, &format!("No {} records.", R::KIND));
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records.iter().map(|record| record.row(&ui)).collect();
    println!("{}", table(&ui, &R::columns(), &rows));
    Ok(())
}

/// Turn edit flags into an update; sort order is only meaningful for categories.
fn update_from_args(kind: ReferenceKind, args: &RefEditArgs) -> Result<ReferenceUpdate, ShiftlogError> {
    let mut update = ReferenceUpdate::new();
    if let Some(ref name) = args.name {
        update = update.name(name.as_str());
    }
    if args.clear_description {
        update = update.description(None);
    } else if let Some(ref description) = args.description {
        update = update.description(Some(description.clone()));
    }
    if let Some(sort_order) = args.sort_order {
        if kind != ReferenceKind::Category {
            return Err(ShiftlogError::InvalidInput(format!(
                "--sort-order applies to categories, not {}",
                kind
            )));
        }
        update = update.sort_order(sort_order);
    }
    if update.is_empty() {
        return Err(ShiftlogError::InvalidInput(
            "Nothing to change (use --name, --description, --clear-description or --sort-order)"
                .to_string(),
        ));
    }
    Ok(update)
}

fn edit_record<R: RecordView>(ctx: &AppContext, args: &RefEditArgs) -> anyhow::Result<()> {
    let update = update_from_args(R::KIND, args)?;
    let session = ctx.open_session()?;
    let snapshot = session.store.references()?;
    let id = R::lookup(R::records(&snapshot), &args.target)?.id();

    let record = session
        .store
        .manage_references(|manager| manager.update::<R>(&id, &update))?;
    session.close()?;

    if !ctx.quiet() {
        let ui = ctx.ui_context(false, None);
        let id = record.id().to_string();
        print(
            &ui,
            &receipt(
                &ui,
                &format!("Updated {}", R::KIND),
                &[("Name", record.name()), ("ID", id.as_str())],
            ),
        );
    }
    Ok(())
}

fn set_active<R: RecordView>(
    ctx: &AppContext,
    args: &RefTargetArgs,
    active: bool,
) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let snapshot = session.store.references()?;
    let id = R::lookup(R::records(&snapshot), &args.target)?.id();

    let record = session.store.manage_references(|manager| {
        if active {
            manager.reactivate::<R>(&id)
        } else {
            manager.deactivate::<R>(&id)
        }
    })?;
    session.close()?;

    if !ctx.quiet() {
        let ui = ctx.ui_context(false, None);
        let id = record.id().to_string();
        let title = if active {
            format!("Reactivated {}", R::KIND)
        } else {
            format!("Deactivated {}", R::KIND)
        };
        print(
            &ui,
            &receipt(&ui, &title, &[("Name", record.name()), ("ID", id.as_str())]),
        );
    }
    Ok(())
}
