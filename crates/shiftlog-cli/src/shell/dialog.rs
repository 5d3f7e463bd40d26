//! Which dialog the interactive shell is showing, and the menus that lead there.

/// The dialog currently open in the shell. `None` is the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveDialog {
    #[default]
    None,
    AddEntry,
    CategoryManager,
    EquipmentManager,
    LocationManager,
    Report,
}

impl ActiveDialog {
    pub fn title(&self) -> &'static str {
        match self {
            Self::None => "Main menu",
            Self::AddEntry => "New entry",
            Self::CategoryManager => "Categories",
            Self::EquipmentManager => "Equipment",
            Self::LocationManager => "Locations",
            Self::Report => "Shift report",
        }
    }
}

/// Main menu choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddEntry,
    ListEntries,
    Filter,
    ClearFilters,
    CancelEntry,
    ActivateEntry,
    Categories,
    Equipment,
    Locations,
    Report,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 11] = [
        MenuAction::AddEntry,
        MenuAction::ListEntries,
        MenuAction::Filter,
        MenuAction::ClearFilters,
        MenuAction::CancelEntry,
        MenuAction::ActivateEntry,
        MenuAction::Categories,
        MenuAction::Equipment,
        MenuAction::Locations,
        MenuAction::Report,
        MenuAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AddEntry => "Add entry",
            Self::ListEntries => "List entries",
            Self::Filter => "Set filters",
            Self::ClearFilters => "Clear filters",
            Self::CancelEntry => "Cancel an entry",
            Self::ActivateEntry => "Activate a draft",
            Self::Categories => "Manage categories",
            Self::Equipment => "Manage equipment",
            Self::Locations => "Manage locations",
            Self::Report => "Shift report",
            Self::Quit => "Quit",
        }
    }

    /// The dialog this choice opens. Actions handled inline on the main
    /// menu stay on `ActiveDialog::None`.
    pub fn dialog(&self) -> ActiveDialog {
        match self {
            Self::AddEntry => ActiveDialog::AddEntry,
            Self::Categories => ActiveDialog::CategoryManager,
            Self::Equipment => ActiveDialog::EquipmentManager,
            Self::Locations => ActiveDialog::LocationManager,
            Self::Report => ActiveDialog::Report,
            Self::ListEntries
            | Self::Filter
            | Self::ClearFilters
            | Self::CancelEntry
            | Self::ActivateEntry
            | Self::Quit => ActiveDialog::None,
        }
    }
}

/// Reference manager choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerAction {
    List,
    Add,
    Rename,
    Deactivate,
    Reactivate,
    Back,
}

impl ManagerAction {
    pub const ALL: [ManagerAction; 6] = [
        ManagerAction::List,
        ManagerAction::Add,
        ManagerAction::Rename,
        ManagerAction::Deactivate,
        ManagerAction::Reactivate,
        ManagerAction::Back,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Add => "Add",
            Self::Rename => "Rename",
            Self::Deactivate => "Deactivate",
            Self::Reactivate => "Reactivate",
            Self::Back => "Back",
        }
    }

    /// Whether the action changes the journal.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Rename | Self::Deactivate | Self::Reactivate
        )
    }
}

pub fn labels<T: Copy>(items: &[T], label: impl Fn(&T) -> &'static str) -> Vec<String> {
    items.iter().map(|item| label(item).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_defaults_to_main_menu() {
        assert_eq!(ActiveDialog::default(), ActiveDialog::None);
        assert_eq!(ActiveDialog::None.title(), "Main menu");
    }

    #[test]
    fn test_menu_opens_dialogs() {
        assert_eq!(MenuAction::AddEntry.dialog(), ActiveDialog::AddEntry);
        assert_eq!(MenuAction::Equipment.dialog(), ActiveDialog::EquipmentManager);
        assert_eq!(MenuAction::Report.dialog(), ActiveDialog::Report);
        assert_eq!(MenuAction::CancelEntry.dialog(), ActiveDialog::None);
        assert_eq!(MenuAction::Quit.dialog(), ActiveDialog::None);
    }

    #[test]
    fn test_menu_labels_are_unique() {
        let labels = labels(&MenuAction::ALL, MenuAction::label);
        let mut deduped = labels.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(labels.len(), deduped.len());
        assert_eq!(labels.last().map(String::as_str), Some("Quit"));
    }

    #[test]
    fn test_manager_mutations() {
        assert!(ManagerAction::Add.mutates());
        assert!(ManagerAction::Reactivate.mutates());
        assert!(!ManagerAction::List.mutates());
        assert!(!ManagerAction::Back.mutates());
    }
}
