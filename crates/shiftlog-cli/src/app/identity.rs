//! Operator identity backed by the config file.

use std::path::PathBuf;

use shiftlog_core::{Identity, ShiftlogError};

use crate::config::{read_config_or_default, write_config};

/// Where the current display name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// `--user` or SHIFTLOG_USER
    Override,
    /// `[user] name` in config.toml
    Config,
    None,
}

/// The operator named by `--user`/SHIFTLOG_USER or by `[user] name`.
#[derive(Debug)]
pub struct ConfigIdentity {
    name: Option<String>,
    source: IdentitySource,
    config_path: PathBuf,
}

impl ConfigIdentity {
    pub fn resolve(
        override_name: Option<&str>,
        config_name: Option<&str>,
        config_path: PathBuf,
    ) -> Self {
        let clean = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        let (name, source) = match override_name.and_then(clean) {
            Some(name) => (Some(name), IdentitySource::Override),
            None => match config_name.and_then(clean) {
                Some(name) => (Some(name), IdentitySource::Config),
                None => (None, IdentitySource::None),
            },
        };
        Self {
            name,
            source,
            config_path,
        }
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }

    /// Record `name` as the signed-in operator.
    pub fn sign_in(&mut self, name: &str) -> anyhow::Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShiftlogError::Validation("Operator name is required".to_string()).into());
        }
        let mut config = read_config_or_default(&self.config_path)?;
        config.user.name = Some(name.to_string());
        write_config(&self.config_path, &config)?;

        self.name = Some(name.to_string());
        self.source = IdentitySource::Config;
        tracing::info!(target: "shiftlog", event = "signed_in", operator = name);
        Ok(())
    }
}

impl Identity for ConfigIdentity {
    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn sign_out(&mut self) -> shiftlog_core::Result<()> {
        let storage_error = |e: anyhow::Error| ShiftlogError::Storage(e.to_string());
        let mut config = read_config_or_default(&self.config_path).map_err(storage_error)?;
        if config.user.name.take().is_some() {
            write_config(&self.config_path, &config).map_err(storage_error)?;
        }

        self.name = None;
        self.source = IdentitySource::None;
        tracing::info!(target: "shiftlog", event = "signed_out");
        Ok(())
    }
}
