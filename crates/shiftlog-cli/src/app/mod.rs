//! Application context: config, journal location, passphrase and session.

mod identity;
mod session;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;

use shiftlog_core::{AgeSqliteBackend, EntryStore, ShiftlogError};

use crate::cli::Cli;
use crate::config::{
    default_config_path, default_journal_path, read_config_or_default, ShiftlogConfig,
};
use crate::constants::exit_codes;
use crate::helpers::{env_passphrase, prompt_passphrase};
use crate::ui::UiContext;

pub use identity::{ConfigIdentity, IdentitySource};
pub use session::Session;

const MAX_PASSPHRASE_ATTEMPTS: u32 = 3;

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("SHIFTLOG_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// CLI arguments bundled with the loaded configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: ShiftlogConfig,
    config_path: PathBuf,
    timezone: Tz,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> anyhow::Result<Self> {
        let config_path = resolve_config_path()?;
        let config = read_config_or_default(&config_path)?;
        let timezone = config.timezone()?;
        Ok(Self {
            cli,
            config,
            config_path,
            timezone,
        })
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Prompts are allowed only on a terminal and without `--no-input`.
    pub fn interactive(&self) -> bool {
        !self.cli.no_input && std::io::stdin().is_terminal()
    }

    pub fn ui_context(&self, json: bool, format: Option<&str>) -> UiContext {
        UiContext::from_env(json, format, self.cli.no_color, self.cli.ascii)
            .with_timezone(self.timezone)
    }

    /// `--journal`/SHIFTLOG_PATH, then `[journal] path`, then the XDG default.
    pub fn journal_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(ref path) = self.cli.journal {
            return Ok(PathBuf::from(path));
        }
        match self.config.journal.path {
            Some(ref path) => Ok(PathBuf::from(path)),
            None => default_journal_path(),
        }
    }

    pub fn identity(&self) -> ConfigIdentity {
        ConfigIdentity::resolve(
            self.cli.user.as_deref(),
            self.config.user.name.as_deref(),
            self.config_path.clone(),
        )
    }

    /// Unlock the journal and load it into a session.
    pub fn open_session(&self) -> anyhow::Result<Session> {
        let path = self.journal_path()?;
        if !path.exists() {
            exit_not_found_with_hint(
                &missing_journal_message(&path),
                "Run `shiftlog init`, or point SHIFTLOG_PATH at an existing journal.",
            );
        }
        let backend = open_with_retry(&path, self.interactive())?;
        let store = EntryStore::open(backend)?;
        Ok(Session::new(self.identity(), store))
    }
}

/// Open the journal, prompting up to three times on a terminal.
fn open_with_retry(path: &Path, interactive: bool) -> anyhow::Result<AgeSqliteBackend> {
    if let Some(passphrase) = env_passphrase() {
        return Ok(AgeSqliteBackend::open(path, &passphrase)?);
    }

    let max_attempts = if interactive { MAX_PASSPHRASE_ATTEMPTS } else { 1 };
    let mut attempts = 0;
    loop {
        attempts += 1;
        let passphrase = prompt_passphrase(interactive)?;
        match AgeSqliteBackend::open(path, &passphrase) {
            Ok(backend) => return Ok(backend),
            Err(ShiftlogError::IncorrectPassphrase) if attempts < max_attempts => {
                let remaining = max_attempts - attempts;
                eprintln!(
                    "Incorrect passphrase. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub fn missing_journal_message(path: &Path) -> String {
    format!("No journal found at {}", path.display())
}

pub fn exit_not_found_with_hint(message: &str, hint: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Hint: {}", hint);
    std::process::exit(exit_codes::NOT_FOUND);
}
