//! Persistence for Shiftlog.
//!
//! The storage layer is backend-agnostic: the entry store and reference
//! managers only see the [`JournalBackend`] trait.
//!
//! - [`AgeSqliteBackend`]: Age-encrypted SQLite held in memory, written
//!   atomically on close. This is what the CLI ships with.
//! - [`MemoryBackend`]: plain vectors, for tests and embedding.

pub mod age_sqlite;
pub mod encryption;
pub mod memory;
pub mod traits;

pub use age_sqlite::{AgeSqliteBackend, JournalMetadata};
pub use memory::MemoryBackend;
pub use traits::JournalBackend;
