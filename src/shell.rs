//! Line-oriented front end: one command per line, driving a [`Store`]
//! through [`Commands`].

use crate::action::{add_file, close_file, focus_file, Action, Dispatch};
use crate::bridge::Bridge;
use crate::command::Command;
use crate::commands::{CommandError, CommandResult, Commands};
use crate::pane::PaneId;
use crate::state::{EditorState, Store};
use crate::widget::WidgetRegistry;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Whether the shell keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<B> {
    store: Store,
    widgets: WidgetRegistry,
    bridge: B,
    working_directory: Option<PathBuf>,
}

impl<B: Bridge> Shell<B> {
    pub fn new(bridge: B, state: EditorState, working_directory: Option<PathBuf>) -> Self {
        let mut shell = Self {
            store: Store::new(state),
            widgets: WidgetRegistry::new(),
            bridge,
            working_directory,
        };
        shell.sync_widgets();
        shell
    }

    pub fn state(&self) -> &EditorState {
        self.store.state()
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    /// Run one input line, writing any feedback to `out`
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        let Some((command, arg)) = Command::parse(line) else {
            writeln!(out, "unknown command: {} (try `help`)", line.trim())?;
            return Ok(Flow::Continue);
        };

        let result = match command {
            Command::NewFile => {
                self.store.dispatch(add_file(None, None));
                Ok(())
            }
            Command::OpenFile => {
                self.with_commands(|c, _, d| c.show_open_file_dialog_for_active_file(d))
            }
            Command::SaveFile => self.with_commands(|c, state, d| c.save_active_file(state, d)),
            Command::SaveFileAs if arg.is_empty() => self.with_commands(|c, state, d| {
                c.show_save_file_dialog_for_active_file(state, d)
            }),
            Command::SaveFileAs => {
                let filename = self.resolve(arg);
                self.with_commands(|c, state, d| c.save_active_file_as(state, d, &filename))
            }
            Command::FocusFile => self.focus(arg),
            Command::CloseFile => self.close(arg),
            Command::Type => self.append(arg),
            Command::List => return self.list(out).map(|_| Flow::Continue),
            Command::Help => {
                for c in Command::all() {
                    writeln!(out, "  {:<8} {:<14} {}", c.keyword(), c.name(), c.keybinding())?;
                }
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        self.sync_widgets();
        if let Err(e) = result {
            writeln!(out, "error: {}", e)?;
        }
        Ok(Flow::Continue)
    }

    fn with_commands(
        &mut self,
        f: impl FnOnce(
            &mut Commands<'_, B, WidgetRegistry>,
            &EditorState,
            &mut Vec<Action>,
        ) -> CommandResult,
    ) -> CommandResult {
        let Self {
            store,
            widgets,
            bridge,
            working_directory,
        } = self;
        store.run(|state, dispatch| {
            let mut commands = Commands::new(bridge, widgets, working_directory.as_deref());
            f(&mut commands, state, dispatch)
        })
    }

    fn focus(&mut self, arg: &str) -> CommandResult {
        if !arg.is_empty() {
            let id = self.known_pane(arg)?;
            self.store.dispatch(focus_file(id));
        }
        self.with_commands(|c, state, d| c.focus(state, d))
    }

    fn close(&mut self, arg: &str) -> CommandResult {
        let id = if arg.is_empty() {
            self.state()
                .focused_pane()
                .map(|p| p.id.clone())
                .ok_or(CommandError::NoFocusedPane)?
        } else {
            self.known_pane(arg)?
        };
        self.store.dispatch(close_file(id));
        Ok(())
    }

    fn known_pane(&self, arg: &str) -> Result<PaneId, CommandError> {
        let id = PaneId::from(arg);
        match self.state().pane(&id) {
            Some(_) => Ok(id),
            None => Err(CommandError::UnknownPane(id)),
        }
    }

    fn append(&mut self, text: &str) -> CommandResult {
        let id = self
            .state()
            .focused_pane()
            .map(|p| p.id.clone())
            .ok_or(CommandError::NoFocusedPane)?;
        let widget = self
            .widgets
            .get_mut(&id)
            .ok_or_else(|| CommandError::WidgetNotMounted(id.clone()))?;
        widget.push_str(text);
        widget.push_str("\n");
        Ok(())
    }

    fn list(&self, out: &mut impl Write) -> io::Result<()> {
        if self.state().panes().is_empty() {
            return writeln!(out, "no open files");
        }
        for pane in self.state().panes() {
            let marker = if pane.has_focus { '*' } else { ' ' };
            let path = pane
                .filename
                .as_ref()
                .map(|f| f.display().to_string())
                .unwrap_or_default();
            writeln!(out, "{} {} {} {}", marker, pane.id, pane.title(), path)?;
        }
        Ok(())
    }

    fn resolve(&self, arg: &str) -> PathBuf {
        let path = Path::new(arg);
        match &self.working_directory {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Mount buffers for new panes, loading file-backed ones through the
    /// bridge, and keep widget focus in line with pane focus.
    fn sync_widgets(&mut self) {
        let ids: Vec<PaneId> = self.state().panes().iter().map(|p| p.id.clone()).collect();
        for id in self.widgets.sync(&ids) {
            let Some(filename) = self.state().pane(&id).and_then(|p| p.filename.clone()) else {
                continue;
            };
            match self.bridge.read_file(&filename) {
                Ok(text) => {
                    if let Some(widget) = self.widgets.get_mut(&id) {
                        widget.set_text(text);
                    }
                }
                Err(e) => log::error!("failed to load {}: {}", filename.display(), e),
            }
        }

        let focused = self.state().focused_pane().map(|p| p.id.clone());
        for id in &ids {
            if Some(id) != focused.as_ref() {
                if let Some(widget) = self.widgets.get_mut(id) {
                    widget.blur();
                }
            }
        }
    }
}
