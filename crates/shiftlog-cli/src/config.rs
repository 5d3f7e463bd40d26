use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use shiftlog_core::ShiftlogError;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ShiftlogConfig {
    #[serde(default)]
    pub journal: JournalSection,
    #[serde(default)]
    pub user: UserSection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JournalSection {
    pub path: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserSection {
    /// Display name of the signed-in operator
    pub name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UiSection {
    /// IANA zone name used to display timestamps
    pub timezone: Option<String>,
}

impl ShiftlogConfig {
    /// Display zone, UTC when unset.
    pub fn timezone(&self) -> anyhow::Result<Tz> {
        match self.ui.timezone.as_deref() {
            None => Ok(Tz::UTC),
            Some(value) => parse_timezone(value),
        }
    }
}

pub fn parse_timezone(value: &str) -> anyhow::Result<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| {
            anyhow::Error::from(ShiftlogError::InvalidInput(format!(
                "Unknown timezone: {}",
                value.trim()
            )))
        })
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_journal_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("journal.shiftlog"))
}

pub fn read_config(path: &Path) -> anyhow::Result<ShiftlogConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Read the config at `path`, or an empty one if the file does not exist.
pub fn read_config_or_default(path: &Path) -> anyhow::Result<ShiftlogConfig> {
    if path.exists() {
        read_config(path)
    } else {
        Ok(ShiftlogConfig::default())
    }
}

pub fn write_config(path: &Path, config: &ShiftlogConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    shiftlog_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("shiftlog"));
        }
    }
    Ok(home_dir()?.join(".config").join("shiftlog"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("shiftlog"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("shiftlog"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
