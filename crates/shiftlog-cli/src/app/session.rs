//! An opened journal together with the current operator.

use shiftlog_core::{AgeSqliteBackend, EntryStore, Identity};

use super::identity::ConfigIdentity;

/// Explicit session context handed to every command that touches the journal.
pub struct Session {
    pub identity: ConfigIdentity,
    pub store: EntryStore<AgeSqliteBackend>,
}

impl Session {
    pub fn new(identity: ConfigIdentity, store: EntryStore<AgeSqliteBackend>) -> Self {
        Self { identity, store }
    }

    /// Display name of the signed-in operator, or `NotSignedIn`.
    pub fn operator(&self) -> shiftlog_core::Result<String> {
        self.identity.require_name().map(str::to_string)
    }

    /// Write pending changes without closing.
    pub fn save(&self) -> anyhow::Result<()> {
        self.store.with_backend(|backend| backend.save())?;
        Ok(())
    }

    /// Write pending changes and release the journal.
    pub fn close(self) -> anyhow::Result<()> {
        self.store.into_backend()?.close()?;
        Ok(())
    }
}
