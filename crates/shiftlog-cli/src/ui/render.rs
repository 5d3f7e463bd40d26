//! Printers shared by commands and the shell.
//!
//! Pretty output is for an operator at a terminal. Plain output is `key=value`
//! lines and tab-separated rows. JSON mode prints nothing through here.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, NOTHING, UTF8_FULL};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use super::context::UiContext;
use super::mode::OutputMode;
use super::theme::{styled, styles, Mark};

/// `Shiftlog · list (status=active)` in pretty mode, `shiftlog list` in plain.
pub fn header(ctx: &UiContext, command: &str, context: Option<&str>) -> String {
    match ctx.mode {
        OutputMode::Json => String::new(),
        OutputMode::Plain => format!("shiftlog {}", command),
        OutputMode::Pretty => {
            let mut line = format!(
                "{} \u{00B7} {}",
                styled("Shiftlog", styles::bold(), ctx.color),
                command
            );
            if let Some(context) = context {
                line.push_str(&format!(" ({})", context));
            }
            line
        }
    }
}

pub fn divider(ctx: &UiContext) -> String {
    match ctx.mode.is_pretty() && ctx.unicode {
        true => "\u{2500}".repeat(ctx.width.min(60)),
        false => "---".to_owned(),
    }
}

/// Plain keys are snake_case so scripts can grep for `cancelled_by=`.
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if !ctx.mode.is_pretty() {
        return format!("{}={}", plain_key(key), value);
    }
    let label = styled(&format!("{}:", key), styles::dim(), ctx.color);
    format!("{} {}", label, value)
}

fn plain_key(key: &str) -> String {
    key.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

pub fn hint(ctx: &UiContext, text: &str) -> String {
    if !ctx.mode.is_pretty() {
        return format!("hint={}", text);
    }
    format!("{} {}", styled("Hint:", styles::dim(), ctx.color), text)
}

/// Confirmation after a change, e.g. a new entry or a cancelled one.
pub fn receipt(ctx: &UiContext, title: &str, items: &[(&str, &str)]) -> String {
    let (first, indent) = if ctx.mode.is_pretty() {
        (format!("{} {}", Mark::Done.render(ctx.unicode, ctx.color), title), "  ")
    } else {
        ("status=ok".to_owned(), "")
    };
    std::iter::once(first)
        .chain(items.iter().map(|(key, value)| format!("{}{}", indent, kv(ctx, key, value))))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
}

impl Column {
    pub const fn new(header: &'static str) -> Self {
        Self { header }
    }
}

/// Bordered table for reference records and breakdowns.
pub fn table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return tab_separated(rows);
    }
    let mut table = sized_table(ctx);
    if ctx.unicode {
        table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(ASCII_MARKDOWN);
    }
    table.set_header(columns.iter().map(|c| c.header));
    table.add_rows(rows.iter().cloned());
    table.to_string()
}

/// Borderless table for entry lists, with dim headers.
pub fn simple_table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return tab_separated(rows);
    }
    let mut table = sized_table(ctx);
    table.load_preset(NOTHING);
    table.set_header(columns.iter().map(|c| {
        let cell = Cell::new(c.header);
        match ctx.color {
            true => cell.add_attribute(Attribute::Dim),
            false => cell,
        }
    }));
    for column in table.column_iter_mut() {
        column.set_padding((0, 2));
    }
    table.add_rows(rows.iter().cloned());
    table.to_string()
}

fn sized_table(ctx: &UiContext) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(u16::try_from(ctx.width).unwrap_or(u16::MAX));
    table
}

fn tab_separated(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stdout, suppressed in JSON mode.
pub fn print(ctx: &UiContext, message: &str) {
    if !ctx.mode.is_json() {
        println!("{}", message);
    }
}

pub fn blank_line(ctx: &UiContext) {
    if ctx.mode.is_pretty() {
        println!();
    }
}

pub fn error_message(ctx: &UiContext, message: &str, error_hint: Option<&str>) -> String {
    let first = match ctx.mode.is_pretty() {
        true => format!("{} {}", Mark::Failed.render(ctx.unicode, ctx.color), message),
        false => format!("error={}", message),
    };
    match error_hint {
        Some(text) => format!("{}\n{}", first, hint(ctx, text)),
        None => first,
    }
}

/// Errors go to stderr in every mode, JSON included.
pub fn print_error(ctx: &UiContext, message: &str, error_hint: Option<&str>) {
    eprintln!("{}", error_message(ctx, message, error_hint));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn ctx(mode: OutputMode) -> UiContext {
        UiContext {
            is_tty: mode.is_pretty(),
            color: false,
            unicode: mode.is_pretty(),
            width: 80,
            mode,
            timezone: Tz::UTC,
        }
    }

    #[test]
    fn test_header() {
        let pretty = header(&ctx(OutputMode::Pretty), "list", Some("status=active"));
        assert_eq!(pretty, "Shiftlog \u{00B7} list (status=active)");
        assert_eq!(header(&ctx(OutputMode::Plain), "list", None), "shiftlog list");
        assert!(header(&ctx(OutputMode::Json), "list", None).is_empty());
    }

    #[test]
    fn test_kv_keys() {
        assert_eq!(
            kv(&ctx(OutputMode::Pretty), "Cancelled by", "Petrov"),
            "Cancelled by: Petrov"
        );
        assert_eq!(
            kv(&ctx(OutputMode::Plain), "Cancelled by", "Petrov"),
            "cancelled_by=Petrov"
        );
    }

    #[test]
    fn test_hint() {
        assert_eq!(hint(&ctx(OutputMode::Pretty), "run init"), "Hint: run init");
        assert_eq!(hint(&ctx(OutputMode::Plain), "run init"), "hint=run init");
    }

    #[test]
    fn test_tables() {
        let columns = [Column::new("ID"), Column::new("Status")];
        let rows = vec![
            vec!["7a2e3c0b".to_string(), "active".to_string()],
            vec!["9b3f4d1c".to_string(), "draft".to_string()],
        ];
        assert_eq!(
            table(&ctx(OutputMode::Plain), &columns, &rows),
            "7a2e3c0b\tactive\n9b3f4d1c\tdraft"
        );

        let bordered = table(&ctx(OutputMode::Pretty), &columns, &rows);
        assert!(bordered.contains("Status"));
        assert!(bordered.contains('\u{256D}'));

        let bare = simple_table(&ctx(OutputMode::Pretty), &columns, &rows);
        assert!(bare.contains("9b3f4d1c"));
        assert!(!bare.contains('\u{256D}'));
    }

    #[test]
    fn test_receipt() {
        let items = [("ID", "7a2e3c0b"), ("Status", "cancelled")];
        let pretty = receipt(&ctx(OutputMode::Pretty), "Cancelled entry", &items);
        assert_eq!(
            pretty,
            "[\u{2713}] Cancelled entry\n  ID: 7a2e3c0b\n  Status: cancelled"
        );

        let plain = receipt(&ctx(OutputMode::Plain), "Cancelled entry", &items);
        assert_eq!(plain, "status=ok\nid=7a2e3c0b\nstatus=cancelled");
    }

    #[test]
    fn test_divider() {
        assert!(divider(&ctx(OutputMode::Pretty)).starts_with('\u{2500}'));
        assert_eq!(divider(&ctx(OutputMode::Plain)), "---");
    }

    #[test]
    fn test_error_message() {
        let pretty = error_message(&ctx(OutputMode::Pretty), "Entry not found", Some("Run shiftlog list"));
        assert_eq!(pretty, "[\u{2717}] Entry not found\nHint: Run shiftlog list");

        let plain = error_message(&ctx(OutputMode::Plain), "Entry not found", None);
        assert_eq!(plain, "error=Entry not found");
    }
}
