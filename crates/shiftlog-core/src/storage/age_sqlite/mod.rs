//! Age-encrypted SQLite journal backend.
//!
//! The database is held in memory and serialized to disk with encryption on
//! close. Nothing reaches the disk until [`AgeSqliteBackend::close`] (or
//! [`AgeSqliteBackend::save`]) succeeds.

mod row;

use std::fs;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::serialize::OwnedData;
use rusqlite::{params, Connection, DatabaseName, Transaction};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use uuid::Uuid;

use crate::crypto::validate_passphrase;
use crate::error::{Result, ShiftlogError};
use crate::model::{Category, Equipment, JournalEntry, Location, ReferenceSnapshot};
use crate::storage::encryption::{decrypt, encrypt};
use crate::storage::traits::JournalBackend;

use row::{CategoryRow, EntryRow, NamedRow, CATEGORY_COLUMNS, ENTRY_COLUMNS, NAMED_COLUMNS};

/// On-disk schema version written to the `meta` table.
pub const FORMAT_VERSION: &str = "1";

const SCHEMA: &str = r#"
CREATE TABLE meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE categories (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL UNIQUE COLLATE NOCASE,
    name TEXT NOT NULL,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE equipment (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE locations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE entries (
    id TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    author TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('draft', 'active', 'cancelled')),
    priority TEXT NOT NULL CHECK (priority IN ('low', 'medium', 'high', 'critical')),
    equipment_id TEXT,
    location_id TEXT,
    category_id TEXT,
    cancelled_at TEXT,
    cancelled_by TEXT,
    cancel_reason TEXT,
    created_at TEXT NOT NULL,

    -- Cancellation columns are set together, and only on cancelled entries
    CHECK ((cancelled_at IS NULL) = (cancelled_by IS NULL)
       AND (cancelled_by IS NULL) = (cancel_reason IS NULL)),
    CHECK ((status = 'cancelled') = (cancelled_at IS NOT NULL)),

    FOREIGN KEY (equipment_id) REFERENCES equipment(id),
    FOREIGN KEY (location_id) REFERENCES locations(id),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

CREATE INDEX entries_timestamp ON entries (timestamp);
"#;

/// Journal file metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalMetadata {
    pub format_version: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Age-encrypted SQLite journal backend.
pub struct AgeSqliteBackend {
    path: PathBuf,
    conn: Mutex<Connection>,
    passphrase: SecretString,
}

impl std::fmt::Debug for AgeSqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgeSqliteBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl AgeSqliteBackend {
    /// Create a new, empty encrypted journal at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file already exists or the passphrase is too short.
    pub fn create(path: &Path, passphrase: &str) -> Result<()> {
        if path.exists() {
            return Err(ShiftlogError::Storage(
                "Journal file already exists".to_string(),
            ));
        }

        validate_passphrase(passphrase)?;

        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        let created_at = Utc::now().to_rfc3339();
        for (key, value) in [
            ("format_version", FORMAT_VERSION),
            ("created_at", created_at.as_str()),
            ("last_modified", created_at.as_str()),
        ] {
            conn.execute(
                "INSERT INTO meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }

        let plaintext = conn.serialize(DatabaseName::Main)?;
        let encrypted = encrypt(plaintext.as_ref(), passphrase)?;
        Self::write_file(path, &encrypted)?;

        tracing::info!(
            target: "shiftlog",
            event = "journal_created",
            path = %path.display()
        );
        Ok(())
    }

    /// Decrypt and load the journal at `path`.
    ///
    /// # Errors
    ///
    /// `JournalNotFound` if the file is missing, `IncorrectPassphrase` if it
    /// cannot be decrypted with `passphrase`.
    pub fn open(path: &Path, passphrase: &str) -> Result<Self> {
        if !path.exists() {
            return Err(ShiftlogError::JournalNotFound);
        }

        validate_passphrase(passphrase)?;

        let encrypted = fs::read(path)?;
        let plaintext = decrypt(&encrypted, passphrase)?;
        let mut conn = Connection::open_in_memory()?;
        let owned_data = Self::owned_data_from_bytes(&plaintext)?;
        conn.deserialize(DatabaseName::Main, owned_data, false)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let format_version = read_meta(&conn, "format_version")?;
        if format_version != FORMAT_VERSION {
            return Err(ShiftlogError::Storage(format!(
                "Unsupported journal format version {}",
                format_version
            )));
        }

        tracing::info!(
            target: "shiftlog",
            event = "journal_opened",
            path = %path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
            passphrase: SecretString::from(passphrase.to_string()),
        })
    }

    /// Path of the encrypted journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encrypt the current database and replace the journal file.
    pub fn save(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        let data = conn.serialize(DatabaseName::Main)?;
        let encrypted = encrypt(data.as_ref(), self.passphrase.expose_secret())?;
        Self::write_file(&self.path, &encrypted)?;
        tracing::debug!(target: "shiftlog", event = "journal_saved", bytes = encrypted.len());
        Ok(())
    }

    /// Save and release the journal.
    pub fn close(self) -> Result<()> {
        self.save()?;
        tracing::info!(
            target: "shiftlog",
            event = "journal_closed",
            path = %self.path.display()
        );
        Ok(())
    }

    pub fn metadata(&self) -> Result<JournalMetadata> {
        let conn = self.lock_conn()?;
        Ok(JournalMetadata {
            format_version: read_meta(&conn, "format_version")?,
            created_at: parse_meta_timestamp(&read_meta(&conn, "created_at")?, "created_at")?,
            last_modified: parse_meta_timestamp(
                &read_meta(&conn, "last_modified")?,
                "last_modified",
            )?,
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ShiftlogError::Storage("SQLite connection poisoned".to_string()))
    }

    fn owned_data_from_bytes(bytes: &[u8]) -> Result<OwnedData> {
        if bytes.is_empty() {
            return Err(ShiftlogError::Storage("SQLite payload is empty".to_string()));
        }

        let size: i32 = bytes
            .len()
            .try_into()
            .map_err(|_| ShiftlogError::Storage("SQLite payload too large".to_string()))?;

        // SAFETY: sqlite3_malloc returns a valid pointer or null; null is
        // checked below. `size` fits in i32.
        let raw = unsafe { rusqlite::ffi::sqlite3_malloc(size) as *mut u8 };
        let ptr = NonNull::new(raw)
            .ok_or_else(|| ShiftlogError::Storage("SQLite allocation failed".to_string()))?;

        // SAFETY: `ptr` is a fresh sqlite3_malloc buffer of exactly
        // `bytes.len()` bytes, so it is writable for that length and cannot
        // overlap `bytes`. OwnedData takes ownership and frees it through SQLite.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len());
            Ok(OwnedData::from_raw_nonnull(ptr, bytes.len()))
        }
    }

    fn write_file(path: &Path, data: &[u8]) -> Result<()> {
        crate::fs::write_atomic(path, data)
            .map_err(|e| ShiftlogError::Storage(format!("Atomic write failed: {}", e)))
    }

    /// Run `f` in a transaction that also bumps `last_modified`.
    fn write_tx<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.execute(
            "UPDATE meta SET value = ?1 WHERE key = 'last_modified'",
            params![Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(value)
    }
}

fn read_meta(conn: &Connection, key: &str) -> Result<String> {
    Ok(conn.query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
        row.get(0)
    })?)
}

fn parse_meta_timestamp(value: &str, what: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| ShiftlogError::Storage(format!("Invalid {} timestamp: {}", what, e)))?
        .with_timezone(&Utc))
}

fn opt_id(id: Option<Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

impl JournalBackend for AgeSqliteBackend {
    fn load_entries(&self) -> Result<Vec<JournalEntry>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM entries ORDER BY rowid",
            ENTRY_COLUMNS
        ))?;
        let rows = stmt.query_map([], EntryRow::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(JournalEntry::try_from(row?)?);
        }
        Ok(entries)
    }

    fn insert_entry(&mut self, entry: &JournalEntry) -> Result<()> {
        let cancellation = entry.cancellation.as_ref();
        self.write_tx(|tx| {
            tx.execute(
                &format!(
                    "INSERT INTO entries ({}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    ENTRY_COLUMNS
                ),
                params![
                    entry.id.to_string(),
                    entry.category.as_str(),
                    entry.title,
                    entry.description,
                    entry.timestamp.to_rfc3339(),
                    entry.author,
                    entry.status.as_str(),
                    entry.priority.as_str(),
                    opt_id(entry.equipment_id),
                    opt_id(entry.location_id),
                    opt_id(entry.category_id),
                    cancellation.map(|c| c.cancelled_at.to_rfc3339()),
                    cancellation.map(|c| c.cancelled_by.as_str()),
                    cancellation.map(|c| c.reason.as_str()),
                    entry.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    fn update_entry(&mut self, entry: &JournalEntry) -> Result<()> {
        let cancellation = entry.cancellation.as_ref();
        self.write_tx(|tx| {
            let changed = tx.execute(
                "UPDATE entries \
                 SET status = ?1, cancelled_at = ?2, cancelled_by = ?3, cancel_reason = ?4 \
                 WHERE id = ?5",
                params![
                    entry.status.as_str(),
                    cancellation.map(|c| c.cancelled_at.to_rfc3339()),
                    cancellation.map(|c| c.cancelled_by.as_str()),
                    cancellation.map(|c| c.reason.as_str()),
                    entry.id.to_string(),
                ],
            )?;
            if changed == 0 {
                return Err(ShiftlogError::EntryNotFound(entry.id));
            }
            Ok(())
        })
    }

    fn load_references(&self) -> Result<ReferenceSnapshot> {
        let conn = self.lock_conn()?;
        let mut snapshot = ReferenceSnapshot::default();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY rowid",
            CATEGORY_COLUMNS
        ))?;
        for row in stmt.query_map([], CategoryRow::from_row)? {
            snapshot.categories.push(Category::try_from(row?)?);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM equipment ORDER BY rowid",
            NAMED_COLUMNS
        ))?;
        for row in stmt.query_map([], NamedRow::from_row)? {
            snapshot.equipment.push(Equipment::try_from(row?)?);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM locations ORDER BY rowid",
            NAMED_COLUMNS
        ))?;
        for row in stmt.query_map([], NamedRow::from_row)? {
            snapshot.locations.push(Location::try_from(row?)?);
        }

        Ok(snapshot)
    }

    fn insert_category(&mut self, category: &Category) -> Result<()> {
        self.write_tx(|tx| {
            tx.execute(
                &format!(
                    "INSERT INTO categories ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    CATEGORY_COLUMNS
                ),
                params![
                    category.id.to_string(),
                    category.code,
                    category.name,
                    category.description,
                    category.is_active,
                    category.sort_order,
                    category.created_at.to_rfc3339(),
                    category.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    fn update_category(&mut self, category: &Category) -> Result<()> {
        self.write_tx(|tx| {
            let changed = tx.execute(
                "UPDATE categories \
                 SET code = ?1, name = ?2, description = ?3, is_active = ?4, sort_order = ?5, \
                     updated_at = ?6 \
                 WHERE id = ?7",
                params![
                    category.code,
                    category.name,
                    category.description,
                    category.is_active,
                    category.sort_order,
                    category.updated_at.to_rfc3339(),
                    category.id.to_string(),
                ],
            )?;
            if changed == 0 {
                return Err(ShiftlogError::NotFound(format!("category {}", category.id)));
            }
            Ok(())
        })
    }

    fn insert_equipment(&mut self, equipment: &Equipment) -> Result<()> {
        self.write_tx(|tx| {
            insert_named(
                tx,
                "equipment",
                &equipment.id,
                &equipment.name,
                equipment.description.as_deref(),
                equipment.is_active,
                &equipment.created_at,
                &equipment.updated_at,
            )
        })
    }

    fn update_equipment(&mut self, equipment: &Equipment) -> Result<()> {
        self.write_tx(|tx| {
            update_named(
                tx,
                "equipment",
                &equipment.id,
                &equipment.name,
                equipment.description.as_deref(),
                equipment.is_active,
                &equipment.updated_at,
            )
        })
    }

    fn insert_location(&mut self, location: &Location) -> Result<()> {
        self.write_tx(|tx| {
            insert_named(
                tx,
                "locations",
                &location.id,
                &location.name,
                location.description.as_deref(),
                location.is_active,
                &location.created_at,
                &location.updated_at,
            )
        })
    }

    fn update_location(&mut self, location: &Location) -> Result<()> {
        self.write_tx(|tx| {
            update_named(
                tx,
                "locations",
                &location.id,
                &location.name,
                location.description.as_deref(),
                location.is_active,
                &location.updated_at,
            )
        })
    }

    fn check_integrity(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let status: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if status != "ok" {
            return Err(ShiftlogError::Storage(format!(
                "SQLite integrity check failed: {}",
                status
            )));
        }

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if rows.next()?.is_some() {
            return Err(ShiftlogError::Storage(
                "Foreign key integrity check failed".to_string(),
            ));
        }

        let inconsistent: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries \
             WHERE (status = 'cancelled') != (cancelled_at IS NOT NULL \
                AND cancelled_by IS NOT NULL AND cancel_reason IS NOT NULL)",
            [],
            |row| row.get(0),
        )?;
        if inconsistent > 0 {
            return Err(ShiftlogError::Storage(format!(
                "{} entries have inconsistent cancellation fields",
                inconsistent
            )));
        }

        let metadata_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meta WHERE key IN ('format_version', 'created_at', 'last_modified')",
            [],
            |row| row.get(0),
        )?;
        if metadata_count < 3 {
            return Err(ShiftlogError::Storage(
                "Metadata table missing required keys".to_string(),
            ));
        }

        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn insert_named(
    tx: &Transaction<'_>,
    table: &str,
    id: &Uuid,
    name: &str,
    description: Option<&str>,
    is_active: bool,
    created_at: &DateTime<Utc>,
    updated_at: &DateTime<Utc>,
) -> Result<()> {
    tx.execute(
        &format!(
            "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            table, NAMED_COLUMNS
        ),
        params![
            id.to_string(),
            name,
            description,
            is_active,
            created_at.to_rfc3339(),
            updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn update_named(
    tx: &Transaction<'_>,
    table: &str,
    id: &Uuid,
    name: &str,
    description: Option<&str>,
    is_active: bool,
    updated_at: &DateTime<Utc>,
) -> Result<()> {
    let changed = tx.execute(
        &format!(
            "UPDATE {} SET name = ?1, description = ?2, is_active = ?3, updated_at = ?4 \
             WHERE id = ?5",
            table
        ),
        params![
            name,
            description,
            is_active,
            updated_at.to_rfc3339(),
            id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(ShiftlogError::NotFound(format!("{} {}", table, id)));
    }
    Ok(())
}
