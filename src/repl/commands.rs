//! Command words accepted at the prompt.

use hashbrown::HashMap;

use crate::types::Operator;

/// One parsed prompt command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Run an arithmetic operation.
    Calculate(Operator),
    /// Print the history.
    History,
    /// Empty the history.
    Clear,
    /// Step history back.
    Undo,
    /// Step history forward.
    Redo,
    /// Write the history file.
    Save,
    /// Read the history file.
    Load,
    /// Write the JSON export.
    Export,
    /// Read the JSON export.
    Import,
    /// Print the command list.
    Help,
    /// Leave the loop.
    Exit,
}

impl Command {
    /// Word shown in the help listing.
    pub fn name(self) -> &'static str {
        match self {
            Command::Calculate(op) => op.command_name(),
            Command::History => "hist",
            Command::Clear => "clear",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Save => "save",
            Command::Load => "load",
            Command::Export => "export",
            Command::Import => "import",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }

    /// One-line description for the help listing.
    pub fn description(self) -> &'static str {
        match self {
            Command::Calculate(op) => op.display_name(),
            Command::History => "Display history",
            Command::Clear => "Clear history",
            Command::Undo => "Undo previous operation",
            Command::Redo => "Redo undone operation",
            Command::Save => "Save calculation history",
            Command::Load => "Load calculation history",
            Command::Export => "Export history as JSON",
            Command::Import => "Import history from JSON",
            Command::Help => "Display available commands",
            Command::Exit => "Exit the program",
        }
    }
}

/// Menu order, paired with the single-letter shortcut where one exists.
const MENU: [(Option<char>, Command); 20] = [
    (Some('A'), Command::Calculate(Operator::Percentage)),
    (Some('B'), Command::Calculate(Operator::Modulo)),
    (Some('C'), Command::Calculate(Operator::Multiply)),
    (Some('D'), Command::Calculate(Operator::Root)),
    (Some('E'), Command::Calculate(Operator::AbsoluteDifference)),
    (Some('F'), Command::Calculate(Operator::IntegerDivide)),
    (Some('G'), Command::Calculate(Operator::Add)),
    (Some('H'), Command::Calculate(Operator::Subtract)),
    (Some('I'), Command::Calculate(Operator::Divide)),
    (Some('J'), Command::Calculate(Operator::Power)),
    (Some('K'), Command::History),
    (Some('L'), Command::Clear),
    (Some('M'), Command::Undo),
    (Some('N'), Command::Redo),
    (Some('O'), Command::Save),
    (Some('P'), Command::Load),
    (Some('Q'), Command::Help),
    (Some('R'), Command::Exit),
    (None, Command::Export),
    (None, Command::Import),
];

/// Case-insensitive lookup from command words and letters to [`Command`]s.
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: HashMap<String, Command>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    /// Table with every command word, letter shortcut and alias.
    pub fn new() -> Self {
        let mut entries = HashMap::with_capacity(MENU.len() * 2 + 4);
        for (letter, command) in MENU {
            entries.insert(command.name().to_string(), command);
            if let Some(letter) = letter {
                entries.insert(letter.to_ascii_lowercase().to_string(), command);
            }
        }
        for (alias, op) in [
            ("div", Operator::Divide),
            ("intdiff", Operator::IntegerDivide),
            ("mod", Operator::Modulo),
            ("pow", Operator::Power),
        ] {
            entries.insert(alias.to_string(), Command::Calculate(op));
        }
        entries.insert("history".to_string(), Command::History);
        entries.insert("quit".to_string(), Command::Exit);
        Self { entries }
    }

    /// Resolves a typed word, ignoring case and surrounding whitespace.
    pub fn lookup(&self, word: &str) -> Option<Command> {
        self.entries.get(&word.trim().to_ascii_lowercase()).copied()
    }

    /// Help listing, one command per line in menu order.
    pub fn help_text(&self) -> String {
        MENU.iter()
            .map(|(letter, command)| {
                let key = letter.map(String::from).unwrap_or_default();
                format!("{key:<2} {:<9} {}", command.name(), command.description())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_letters_and_aliases_resolve() {
        let table = CommandTable::new();
        assert_eq!(table.lookup("add"), Some(Command::Calculate(Operator::Add)));
        assert_eq!(table.lookup("  ADD "), Some(Command::Calculate(Operator::Add)));
        assert_eq!(table.lookup("g"), Some(Command::Calculate(Operator::Add)));
        assert_eq!(table.lookup("F"), Some(Command::Calculate(Operator::IntegerDivide)));
        assert_eq!(table.lookup("div"), Some(Command::Calculate(Operator::Divide)));
        assert_eq!(table.lookup("q"), Some(Command::Help));
        assert_eq!(table.lookup("r"), Some(Command::Exit));
        assert_eq!(table.lookup("export"), Some(Command::Export));
        assert_eq!(table.lookup("sqrt"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn every_operator_has_a_command() {
        let table = CommandTable::new();
        for op in Operator::ALL {
            assert_eq!(table.lookup(op.command_name()), Some(Command::Calculate(op)));
        }
    }

    #[test]
    fn help_lists_every_menu_entry() {
        let help = CommandTable::new().help_text();
        assert_eq!(help.lines().count(), MENU.len());
        assert!(help.contains("absdiff"));
        assert!(help.starts_with("A  percent"));
    }
}
