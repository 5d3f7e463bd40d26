//! Domain data model.

pub mod entry;
pub mod reference;

pub use entry::{Cancellation, EntryCategory, EntryStatus, JournalEntry, NewEntry, Priority};
pub use reference::{
    same_name, Category, Equipment, Location, NewCategory, NewNamedRecord, ReferenceKind,
    ReferenceRecord, ReferenceSnapshot, ReferenceUpdate, ResolvedEntry,
};
