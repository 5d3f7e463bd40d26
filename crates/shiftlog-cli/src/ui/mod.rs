//! UI primitives for the Shiftlog CLI.
//!
//! - **Context**: Environment detection (TTY, width, color, unicode, zone)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Outcome marks, styles and symbols
//! - **Render**: Tables, headers, receipts, hints
//! - **Format**: String utilities (truncate, wrap, timestamps)

mod context;
pub mod format;
mod mode;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;

pub use render::{
    blank_line, divider, header, hint, kv, print, print_error, receipt, simple_table, table,
    Column,
};

pub use format::{format_datetime, short_id, single_line, truncate, wrap};
