//! Interactive prompts shared by `add`, `cancel` and the shell.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use shiftlog_core::{EntryCategory, Priority};

const NONE_LABEL: &str = "(none)";

pub fn select_category() -> anyhow::Result<EntryCategory> {
    let labels: Vec<&str> = EntryCategory::ALL.iter().map(|c| c.label()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Category")
        .default(0)
        .items(&labels)
        .interact()?;
    EntryCategory::ALL
        .get(selection)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Invalid category selection"))
}

pub fn select_priority(default: Priority) -> anyhow::Result<Priority> {
    let labels: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
    let default_idx = Priority::ALL
        .iter()
        .position(|p| *p == default)
        .unwrap_or(0);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Priority")
        .default(default_idx)
        .items(&labels)
        .interact()?;
    Priority::ALL
        .get(selection)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Invalid priority selection"))
}

/// Non-empty free text.
pub fn input_text(prompt: &str) -> anyhow::Result<String> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(false)
        .interact_text()?;
    Ok(value)
}

/// Free text that may be left blank.
pub fn input_optional(prompt: &str) -> anyhow::Result<Option<String>> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Pick one of `items` or "(none)". Returns the index into `items`.
pub fn select_optional(prompt: &str, items: &[String]) -> anyhow::Result<Option<usize>> {
    if items.is_empty() {
        return Ok(None);
    }
    let mut options = vec![NONE_LABEL.to_string()];
    options.extend(items.iter().cloned());
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(0)
        .items(&options)
        .interact()?;
    Ok(selection.checked_sub(1))
}

/// Pick one of `items`; `None` when the list is empty.
pub fn select_one(prompt: &str, items: &[String]) -> anyhow::Result<Option<usize>> {
    if items.is_empty() {
        return Ok(None);
    }
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(0)
        .items(items)
        .interact()?;
    Ok(Some(selection))
}

pub fn confirm(prompt: &str, default: bool) -> anyhow::Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
