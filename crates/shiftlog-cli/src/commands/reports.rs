use std::path::Path;

use chrono::Utc;

use shiftlog_core::stats::{by_category, by_priority};
use shiftlog_core::{Report, ReportFormat};

use crate::app::AppContext;
use crate::cli::{ReportArgs, StatsArgs};
use crate::helpers::build_filters;
use crate::output::summary_lines;
use crate::ui::{blank_line, header, kv, print, receipt};

pub fn handle_stats(ctx: &AppContext, args: &StatsArgs) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let references = session.store.references()?;
    let filters = build_filters(&args.filters, &references)?;
    let context = filters.describe().join(" ");
    session.store.set_filters(filters)?;

    let entries = session.store.filtered()?;
    let summary = session.store.summary()?;
    let categories = by_category(&entries);
    let priorities = by_priority(&entries);

    let ui = ctx.ui_context(args.json, None);
    if ui.mode.is_json() {
        let value = serde_json::json!({
            "summary": summary,
            "by_category": categories,
            "by_priority": priorities,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if ui.mode.is_pretty() && !ctx.quiet() {
        let context = (!context.is_empty()).then_some(context.as_str());
        println!("{}", header(&ui, "stats", context));
        blank_line(&ui);
    }
    for line in summary_lines(&ui, &summary) {
        println!("{}", line);
    }
    if !categories.is_empty() {
        blank_line(&ui);
        for (category, count) in &categories {
            let key = if ui.mode.is_pretty() {
                category.label()
            } else {
                category.as_str()
            };
            println!("{}", kv(&ui, key, &count.to_string()));
        }
    }
    if !priorities.is_empty() {
        blank_line(&ui);
        for (priority, count) in &priorities {
            println!("{}", kv(&ui, priority.as_str(), &count.to_string()));
        }
    }
    Ok(())
}

pub fn handle_report(ctx: &AppContext, args: &ReportArgs) -> anyhow::Result<()> {
    let format: ReportFormat = args.format.parse()?;
    let session = ctx.open_session()?;
    let references = session.store.references()?;
    let filters = build_filters(&args.filters, &references)?;

    let entries = session.store.list()?;
    let report = Report::build(&entries, &filters, &references, Utc::now());
    let rendered = report.render(format)?;

    match args.output {
        Some(ref output) => {
            let path = Path::new(output);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to create report directory {}: {}",
                        parent.display(),
                        e
                    )
                })?;
            }
            shiftlog_core::fs::write_atomic(path, rendered.as_bytes())
                .map_err(|e| anyhow::anyhow!("Failed to write report {}: {}", path.display(), e))?;
            tracing::info!(
                target: "shiftlog",
                event = "report_written",
                path = %path.display(),
                rows = report.rows.len()
            );

            if !ctx.quiet() {
                let ui = ctx.ui_context(false, None);
                let rows = report.rows.len().to_string();
                print(
                    &ui,
                    &receipt(
                        &ui,
                        "Wrote report",
                        &[("Path", output.as_str()), ("Entries", rows.as_str())],
                    ),
                );
            }
        }
        None => {
            print!("{}", rendered);
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
