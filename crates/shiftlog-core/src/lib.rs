//! # Shiftlog Core
//!
//! Core library for Shiftlog, an operational shift journal for dispatch
//! crews.
//!
//! This crate provides the domain model, the entry store and its lifecycle
//! rules, filtering, statistics, reports and storage backends, independent of
//! the CLI interface.
//!
//! ## Architecture
//!
//! - **model**: Entries and reference records (categories, equipment, locations)
//! - **store**: The entry store; every mutation is persisted before it is applied
//! - **lifecycle**: draft → active → cancelled transitions
//! - **filter**: Pure, order-preserving entry filtering
//! - **stats**: Summary counts and breakdowns
//! - **references**: Reference data management
//! - **report**: Shift reports (text, Markdown, JSON)
//! - **identity**: The signed-in operator
//! - **storage**: Backend trait, Age-encrypted SQLite and in-memory backends

pub mod crypto;
pub mod error;
pub mod filter;
pub mod fs;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod references;
pub mod report;
pub mod stats;
pub mod storage;
pub mod store;

pub use error::{Result, ShiftlogError};
pub use filter::FilterOptions;
pub use identity::{Identity, StaticIdentity};
pub use model::{
    Cancellation, Category, EntryCategory, EntryStatus, Equipment, JournalEntry, Location,
    NewCategory, NewEntry, NewNamedRecord, Priority, ReferenceKind, ReferenceSnapshot,
    ReferenceUpdate,
};
pub use references::{ManagedRecord, ReferenceManager};
pub use report::{Report, ReportFormat};
pub use stats::Summary;
pub use storage::{AgeSqliteBackend, JournalBackend, MemoryBackend};
pub use store::EntryStore;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
