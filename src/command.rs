/// A command available in the shell
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    NewFile,
    OpenFile,
    SaveFile,
    SaveFileAs,
    FocusFile,
    CloseFile,
    Type,
    List,
    Help,
    Quit,
}

impl Command {
    /// Returns all commands that should be listed by `help`
    pub fn all() -> &'static [Command] {
        &[
            Command::NewFile,
            Command::OpenFile,
            Command::SaveFile,
            Command::SaveFileAs,
            Command::FocusFile,
            Command::CloseFile,
            Command::Type,
            Command::List,
            Command::Help,
            Command::Quit,
        ]
    }

    /// Word typed at the prompt
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::NewFile => "new",
            Command::OpenFile => "open",
            Command::SaveFile => "save",
            Command::SaveFileAs => "save-as",
            Command::FocusFile => "focus",
            Command::CloseFile => "close",
            Command::Type => "type",
            Command::List => "list",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::NewFile => "New File",
            Command::OpenFile => "Open File",
            Command::SaveFile => "Save File",
            Command::SaveFileAs => "Save File As",
            Command::FocusFile => "Focus File",
            Command::CloseFile => "Close File",
            Command::Type => "Append Text",
            Command::List => "List Files",
            Command::Help => "Help",
            Command::Quit => "Quit",
        }
    }

    pub fn keybinding(&self) -> &'static str {
        match self {
            Command::NewFile => "Ctrl+N",
            Command::OpenFile => "Ctrl+O",
            Command::SaveFile => "Ctrl+S",
            Command::SaveFileAs => "Ctrl+Shift+S",
            Command::FocusFile => "",
            Command::CloseFile => "Ctrl+W",
            Command::Type => "",
            Command::List => "",
            Command::Help => "",
            Command::Quit => "Ctrl+Q",
        }
    }

    /// Split an input line into its command and the rest of the line
    pub fn parse(line: &str) -> Option<(Command, &str)> {
        let line = line.trim_start();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line.trim_end(), ""),
        };
        Command::all()
            .iter()
            .find(|c| c.keyword() == word)
            .map(|c| (*c, rest))
    }
}
