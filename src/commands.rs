//! Commands that read the pane state, talk to the bridge and dispatch the
//! resulting action.
//!
//! Each command dispatches at most one action, and only after every bridge
//! call it depends on has succeeded. Bridge failures are logged where they
//! are observed and returned so the caller can decide on UI feedback.

use crate::action::{add_file, file_is_saved, focus_file, Dispatch};
use crate::bridge::{Bridge, BridgeError, DialogOptions, DialogProperty};
use crate::pane::{Pane, PaneId};
use crate::state::EditorState;
use crate::widget::{EditorWidget, WidgetHost};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SAVE_DIALOG_TITLE: &str = "Save File";
pub const OPEN_DIALOG_TITLE: &str = "Select a file to open";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no pane has focus")]
    NoFocusedPane,
    #[error("no pane with id {0}")]
    UnknownPane(PaneId),
    #[error("no editor widget is mounted for pane {0}")]
    WidgetNotMounted(PaneId),
    #[error("dialog was cancelled")]
    DialogCancelled,
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type CommandResult = Result<(), CommandError>;

/// The collaborators a command needs besides the state it reads
pub struct Commands<'a, B: Bridge, W: WidgetHost> {
    bridge: &'a mut B,
    widgets: &'a mut W,
    working_directory: Option<PathBuf>,
}

impl<'a, B: Bridge, W: WidgetHost> Commands<'a, B, W> {
    pub fn new(bridge: &'a mut B, widgets: &'a mut W, working_directory: Option<&Path>) -> Self {
        Self {
            bridge,
            widgets,
            working_directory: working_directory.map(Path::to_path_buf),
        }
    }

    /// Write the focused pane's content to `filename` and record the new name.
    pub fn save_active_file_as(
        &mut self,
        state: &EditorState,
        dispatch: &mut impl Dispatch,
        filename: &Path,
    ) -> CommandResult {
        let pane = focused(state)?;
        let content = self.widget(&pane.id)?.value();

        self.bridge
            .save_file(filename, &content)
            .map_err(logged)?;
        dispatch.dispatch(file_is_saved(pane.id.clone(), Some(filename.to_path_buf())));
        Ok(())
    }

    /// Save the focused pane under its current name, asking for one if it has none.
    pub fn save_active_file(
        &mut self,
        state: &EditorState,
        dispatch: &mut impl Dispatch,
    ) -> CommandResult {
        let pane = focused(state)?;
        let Some(filename) = &pane.filename else {
            return self.show_save_file_dialog_for_active_file(state, dispatch);
        };
        let content = self.widget(&pane.id)?.value();

        self.bridge
            .save_file(filename, &content)
            .map_err(logged)?;
        dispatch.dispatch(file_is_saved(pane.id.clone(), None));
        Ok(())
    }

    pub fn show_save_file_dialog_for_active_file(
        &mut self,
        state: &EditorState,
        dispatch: &mut impl Dispatch,
    ) -> CommandResult {
        let options =
            DialogOptions::new(SAVE_DIALOG_TITLE).default_path(self.working_directory.clone());
        let selection = self.bridge.save_dialog(&options).map_err(logged)?;
        let filename = selection.into_first().ok_or(CommandError::DialogCancelled)?;

        self.save_active_file_as(state, dispatch, &filename)
    }

    /// Ask for a file and open it in a new pane.
    pub fn show_open_file_dialog_for_active_file(
        &mut self,
        dispatch: &mut impl Dispatch,
    ) -> CommandResult {
        let options = DialogOptions::new(OPEN_DIALOG_TITLE)
            .default_path(self.working_directory.clone())
            .property(DialogProperty::OpenFile);
        let selection = self.bridge.open_dialog(&options).map_err(logged)?;
        let filename = selection.into_first().ok_or(CommandError::DialogCancelled)?;

        let stats = self.bridge.file_stats(&filename).map_err(logged)?;
        dispatch.dispatch(add_file(Some(filename), Some(stats)));
        Ok(())
    }

    /// Move input focus to the focused pane's widget.
    pub fn focus(&mut self, state: &EditorState, dispatch: &mut impl Dispatch) -> CommandResult {
        let pane = focused(state)?;
        self.widget(&pane.id)?.focus();
        dispatch.dispatch(focus_file(pane.id.clone()));
        Ok(())
    }

    fn widget(&mut self, id: &PaneId) -> Result<&mut dyn EditorWidget, CommandError> {
        self.widgets
            .widget(id)
            .ok_or_else(|| CommandError::WidgetNotMounted(id.clone()))
    }
}

fn focused(state: &EditorState) -> Result<&Pane, CommandError> {
    state.focused_pane().ok_or(CommandError::NoFocusedPane)
}

fn logged(e: BridgeError) -> CommandError {
    log::error!("bridge request failed: {}", e);
    CommandError::Bridge(e)
}
