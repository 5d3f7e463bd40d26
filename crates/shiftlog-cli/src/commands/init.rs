use std::path::PathBuf;

use dialoguer::{theme::ColorfulTheme, FuzzySelect, Input};

use shiftlog_core::{AgeSqliteBackend, ShiftlogError, VERSION};

use crate::app::AppContext;
use crate::cli::InitArgs;
use crate::config::{default_journal_path, parse_timezone, read_config_or_default, write_config};
use crate::helpers::prompt_init_passphrase;
use crate::ui::theme::{styled, styles};
use crate::ui::{hint, print, receipt};

fn timezone_options() -> Vec<String> {
    let mut zones: Vec<String> = chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| tz.to_string())
        .filter(|tz| tz != "UTC")
        .collect();
    zones.sort();
    zones.insert(0, "UTC".to_string());
    zones
}

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let interactive = ctx.interactive();
    let ui = ctx.ui_context(false, None);
    let theme = ColorfulTheme::default();

    if !ctx.quiet() && interactive && ui.mode.is_pretty() {
        let title = styled("Shiftlog", styles::bold(), ui.color);
        println!("{} \u{00B7} init", title);
        println!("{}\n", styled(&format!("v{}", VERSION), styles::dim(), ui.color));
    }

    let journal_path = match args.path.clone().or_else(|| ctx.cli().journal.clone()) {
        Some(value) => PathBuf::from(value),
        None if interactive => {
            let default = default_journal_path()?;
            let input: String = Input::with_theme(&theme)
                .with_prompt("Journal file location")
                .default(default.to_string_lossy().to_string())
                .interact_text()?;
            PathBuf::from(input)
        }
        None => default_journal_path()?,
    };

    if journal_path.exists() {
        return Err(ShiftlogError::InvalidInput(format!(
            "A journal already exists at {}",
            journal_path.display()
        ))
        .into());
    }

    let timezone = match args.timezone.as_deref() {
        Some(value) => Some(parse_timezone(value)?.to_string()),
        None if interactive => {
            let options = timezone_options();
            let selection = FuzzySelect::with_theme(&theme)
                .with_prompt("Display timezone")
                .default(0)
                .items(&options)
                .interact()?;
            options.get(selection).cloned()
        }
        None => None,
    };

    let passphrase = prompt_init_passphrase(interactive)?;

    if let Some(parent) = journal_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create journal directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    AgeSqliteBackend::create(&journal_path, &passphrase)?;

    let mut config = read_config_or_default(ctx.config_path())?;
    config.journal.path = Some(journal_path.to_string_lossy().to_string());
    if timezone.is_some() {
        config.ui.timezone = timezone;
    }
    write_config(ctx.config_path(), &config)?;

    if !ctx.quiet() {
        let journal = journal_path.display().to_string();
        let config_file = ctx.config_path().display().to_string();
        print(
            &ui,
            &receipt(
                &ui,
                "Created journal",
                &[("Path", journal.as_str()), ("Config", config_file.as_str())],
            ),
        );
        if config.user.name.is_none() && ctx.cli().user.is_none() {
            print(&ui, &hint(&ui, "Sign in with `shiftlog login <name>`"));
        }
    }
    Ok(())
}
