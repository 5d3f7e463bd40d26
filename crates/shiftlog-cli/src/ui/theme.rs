//! Colors and symbols for entries, records and outcomes.

use owo_colors::{OwoColorize, Style};

use shiftlog_core::{EntryStatus, Priority};

/// A symbol with a plain-ASCII fallback for `--ascii` terminals.
#[derive(Debug, Clone, Copy)]
pub struct SymbolPair {
    pub ascii: &'static str,
    pub unicode: &'static str,
}

impl SymbolPair {
    pub const fn new(ascii: &'static str, unicode: &'static str) -> Self {
        Self { ascii, unicode }
    }

    pub fn get(&self, unicode: bool) -> &'static str {
        [self.ascii, self.unicode][usize::from(unicode)]
    }
}

/// Shown next to the priority of active critical entries.
pub const CRITICAL_MARK: SymbolPair = SymbolPair::new("!", "\u{25CF}");

/// Outcome marker that leads receipts and error lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Done,
    Failed,
}

impl Mark {
    fn symbols(self) -> SymbolPair {
        match self {
            Self::Done => SymbolPair::new("[OK]", "[\u{2713}]"),
            Self::Failed => SymbolPair::new("[ERR]", "[\u{2717}]"),
        }
    }

    pub fn render(self, unicode: bool, color: bool) -> String {
        let style = match self {
            Self::Done => styles::success(),
            Self::Failed => styles::error(),
        };
        styled(self.symbols().get(unicode), style, color)
    }
}

pub mod styles {
    use owo_colors::Style;

    pub fn bold() -> Style {
        Style::new().bold()
    }

    /// Labels, inactive records, low priority
    pub fn dim() -> Style {
        Style::new().dimmed()
    }

    pub fn success() -> Style {
        Style::new().green()
    }

    pub fn warning() -> Style {
        Style::new().yellow()
    }

    pub fn error() -> Style {
        Style::new().red().bold()
    }

    /// Drafts
    pub fn info() -> Style {
        Style::new().cyan()
    }
}

pub fn styled(text: &str, style: Style, color: bool) -> String {
    match color {
        true => text.style(style).to_string(),
        false => text.to_owned(),
    }
}

pub fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Low => styles::dim(),
        Priority::Medium => Style::new(),
        Priority::High => styles::warning(),
        Priority::Critical => styles::error(),
    }
}

/// Cancelled entries stay visible but struck through.
pub fn status_style(status: EntryStatus) -> Style {
    match status {
        EntryStatus::Draft => styles::info(),
        EntryStatus::Active => styles::success(),
        EntryStatus::Cancelled => styles::dim().strikethrough(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks() {
        assert_eq!(Mark::Done.render(false, false), "[OK]");
        assert_eq!(Mark::Failed.render(false, false), "[ERR]");
        assert_eq!(Mark::Done.render(true, false), "[\u{2713}]");
    }

    #[test]
    fn test_critical_mark() {
        assert_eq!(CRITICAL_MARK.get(false), "!");
        assert_eq!(CRITICAL_MARK.get(true), "\u{25CF}");
    }

    #[test]
    fn test_styled_respects_color_switch() {
        assert_eq!(styled("critical", styles::error(), false), "critical");
        let colored = styled("critical", priority_style(Priority::Critical), true);
        assert!(colored.contains("critical"));
        assert!(colored.contains('\x1b'));
    }
}
